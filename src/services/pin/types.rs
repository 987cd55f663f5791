use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PIN_SIZE: f64 = 40.0;
pub const DEFAULT_PIN_COLOR: &str = "#ff0000";

pub type PinId = String;
pub type ClientId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinStatus {
    #[default]
    Pending,
    Validated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ClientId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: PinId,
    pub position_x: f64,
    pub position_y: f64,
    pub size: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Last status advertised on the wire. Classification always goes through
    /// `consensus::status`, never through this field.
    #[serde(default)]
    pub status: PinStatus,

    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    #[serde(default)]
    pub validated_by: Vec<ClientId>,
}

impl Pin {
    /// New pin with a fresh id, default size and color.
    pub fn new(position_x: f64, position_y: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            position_x,
            position_y,
            size: DEFAULT_PIN_SIZE,
            color: Some(DEFAULT_PIN_COLOR.to_string()),
            name: None,
            status: PinStatus::Pending,
            messages: Vec::new(),
            validated_by: Vec::new(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Result of a repository mutation that is allowed to be a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    IgnoredUnknownId,
    Unchanged,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
