use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    services::pin::{ClientId, Pin, PinId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    AddPin,
    DeletePin,
    UpdatePin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WireMessage {
    #[serde(rename_all = "camelCase")]
    Initialization {
        pins: Vec<Pin>,
        nb_of_users: usize,
        minimal_nb_of_validations: usize,
        client_id: ClientId,
    },
    #[serde(rename_all = "camelCase")]
    AddPin { sender_id: ClientId, pin: Pin },
    #[serde(rename_all = "camelCase")]
    DeletePin { sender_id: ClientId, pin: Pin },
    #[serde(rename_all = "camelCase")]
    UpdatePin { sender_id: ClientId, pin: Pin },
    #[serde(rename_all = "camelCase")]
    UsersChange {
        nb_of_users: usize,
        minimal_nb_of_validations: usize,
    },
    #[serde(rename_all = "camelCase")]
    Chat {
        pin_id: PinId,
        sender_id: ClientId,
        content: String,
    },
}

impl WireMessage {
    pub fn pin_action(kind: ActionKind, sender_id: ClientId, pin: Pin) -> Self {
        match kind {
            ActionKind::AddPin => Self::AddPin { sender_id, pin },
            ActionKind::DeletePin => Self::DeletePin { sender_id, pin },
            ActionKind::UpdatePin => Self::UpdatePin { sender_id, pin },
        }
    }

    pub fn sender_id(&self) -> Option<&str> {
        match self {
            Self::AddPin { sender_id, .. }
            | Self::DeletePin { sender_id, .. }
            | Self::UpdatePin { sender_id, .. }
            | Self::Chat { sender_id, .. } => Some(sender_id),
            Self::Initialization { .. } | Self::UsersChange { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Initialization { .. } => "initialization",
            Self::AddPin { .. } => "addPin",
            Self::DeletePin { .. } => "deletePin",
            Self::UpdatePin { .. } => "updatePin",
            Self::UsersChange { .. } => "usersChange",
            Self::Chat { .. } => "chat",
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|error| AppError::MalformedMessage(error.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A message fanned out by the relay, tagged with the connection it came from.
#[derive(Debug, Clone)]
pub struct BoardUpdate {
    pub origin: Option<ClientId>,
    pub message: WireMessage,
}
