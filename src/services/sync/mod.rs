//! Client-side board engine.
//!
//! Every mutation enters through one of two paths. Local calls (`add_pin`,
//! `update_pin`, `attest`, ...) commit to the repository, recompute the
//! display state and send exactly one wire message. Inbound messages go
//! through `apply_message`, which commits and recomputes but never sends, so
//! nothing received from the relay is ever echoed back to it.

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    config::BoardConfig,
    error::{AppError, Result},
    services::{
        cluster::{self, DisplayState, Marker},
        consensus::{self, UsersState},
        pin::{
            ChatMessage, ClientId, MutationOutcome, Pin, PinRepository, PinStatus,
            validation::{validate_chat_content, validate_pin},
        },
        selection::SelectionMirror,
    },
    ws::types::{ActionKind, WireMessage},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

pub struct BoardClient {
    config: BoardConfig,
    repository: PinRepository,
    display: DisplayState,
    zoom_factor: f64,
    users: UsersState,
    selection: SelectionMirror,
    channel: Option<UnboundedSender<WireMessage>>,
    client_id: Option<ClientId>,
}

impl Default for BoardClient {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl BoardClient {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            repository: PinRepository::new(),
            display: DisplayState::default(),
            zoom_factor: 1.0,
            users: UsersState::default(),
            selection: SelectionMirror::default(),
            channel: None,
            client_id: None,
        }
    }

    /// Attaches an open outbound channel. Nothing is sent until the relay has
    /// also assigned an identity through `initialization`.
    pub fn connect(&mut self, channel: UnboundedSender<WireMessage>) {
        self.channel = Some(channel);
    }

    pub fn disconnect(&mut self) {
        self.channel = None;
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn users(&self) -> UsersState {
        self.users
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn pins(&self) -> &[Pin] {
        self.repository.pins()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Pin> {
        self.repository.get_by_id(id)
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn status_of(&self, pin: &Pin) -> PinStatus {
        consensus::status(pin, self.users.minimal_nb_of_validations)
    }

    pub fn pin_status(&self, id: &str) -> Option<PinStatus> {
        self.get_by_id(id).map(|pin| self.status_of(pin))
    }

    pub fn selected(&self) -> Option<&Pin> {
        self.selection.selected()
    }

    pub fn select(&mut self, pin: Option<Pin>) {
        let quorum = self.users.minimal_nb_of_validations;
        self.selection.select(pin.map(|pin| consensus::stamped(&pin, quorum)));
    }

    pub fn get_pin_at_coordinates(&self, x: f64, y: f64) -> Option<&Pin> {
        self.display.pin_at(x, y, self.zoom_factor)
    }

    pub fn marker_at(&self, x: f64, y: f64) -> Option<Marker<'_>> {
        self.display.marker_at(x, y, self.zoom_factor)
    }

    pub fn set_zoom(&mut self, zoom_factor: f64) -> Result<()> {
        if !zoom_factor.is_finite() || zoom_factor <= 0.0 {
            return Err(AppError::InvalidParams(
                "Zoom factor must be a positive number".into(),
            ));
        }
        self.zoom_factor = zoom_factor;
        self.refresh_view();
        Ok(())
    }

    /// Restamps every held pin against the current quorum, then reclusters.
    /// Stored, selected and displayed pins always carry the derived status.
    fn refresh_view(&mut self) {
        let quorum = self.users.minimal_nb_of_validations;
        for pin in self.repository.iter_mut() {
            pin.status = consensus::status(pin, quorum);
        }
        if let Some(pin) = self.selection.selected_mut() {
            pin.status = consensus::status(pin, quorum);
        }
        self.display = cluster::recompute(self.repository.pins(), self.zoom_factor);
    }

    fn send(&self, message: WireMessage) -> bool {
        let Some(channel) = &self.channel else {
            return false;
        };
        if self.client_id.is_none() {
            return false;
        }

        let kind = message.kind();
        match channel.send(message) {
            Ok(()) => {
                tracing::debug!(kind, "Sent board update");
                true
            }
            Err(_) => {
                tracing::debug!(kind, "Channel closed, keeping update local");
                false
            }
        }
    }

    /// Sends one pin action stamped with the current status. Returns whether
    /// the message left; without a channel or identity it stays local.
    pub fn send_update(&self, kind: ActionKind, pin: &Pin) -> bool {
        let Some(client_id) = self.client_id.clone() else {
            return false;
        };
        let pin = consensus::stamped(pin, self.users.minimal_nb_of_validations);
        self.send(WireMessage::pin_action(kind, client_id, pin))
    }

    fn after_commit(&mut self, kind: ActionKind, pin: &Pin, origin: Origin) {
        match (kind, origin) {
            (ActionKind::DeletePin, _) => self.selection.on_pin_deleted(&pin.id),
            (ActionKind::AddPin | ActionKind::UpdatePin, Origin::Remote) => {
                self.selection.on_pin_mutated(pin)
            }
            _ => {}
        }
        self.refresh_view();

        if origin == Origin::Local {
            self.send_update(kind, pin);
        }
    }

    fn commit_add(&mut self, pin: Pin, origin: Origin) -> Result<()> {
        self.repository.add(pin.clone())?;
        tracing::debug!(pin_id = %pin.id, ?origin, "Pin added");
        self.after_commit(ActionKind::AddPin, &pin, origin);
        Ok(())
    }

    fn commit_update(&mut self, pin: Pin, origin: Origin) -> MutationOutcome {
        let outcome = self.repository.update(pin.clone());
        match outcome {
            MutationOutcome::Applied => {
                tracing::debug!(pin_id = %pin.id, ?origin, "Pin updated");
                self.after_commit(ActionKind::UpdatePin, &pin, origin);
            }
            _ => tracing::debug!(pin_id = %pin.id, ?origin, "Update ignored, unknown pin"),
        }
        outcome
    }

    fn commit_delete(&mut self, id: &str, origin: Origin) -> MutationOutcome {
        let Some(pin) = self.repository.get_by_id(id).cloned() else {
            tracing::debug!(pin_id = %id, ?origin, "Delete ignored, unknown pin");
            return MutationOutcome::IgnoredUnknownId;
        };
        let outcome = self.repository.delete(id);
        tracing::debug!(pin_id = %id, ?origin, "Pin deleted");
        self.after_commit(ActionKind::DeletePin, &pin, origin);
        outcome
    }

    /// Creates a pin on this client. The creator is recorded as its first
    /// attester whenever an identity has been assigned.
    pub fn add_pin(&mut self, mut pin: Pin) -> Result<()> {
        validate_pin(&self.config, &pin)?;
        if let Some(client_id) = &self.client_id {
            consensus::attest(&mut pin, client_id);
        }
        self.commit_add(pin, Origin::Local)
    }

    pub fn update_pin(&mut self, pin: Pin) -> Result<MutationOutcome> {
        validate_pin(&self.config, &pin)?;
        Ok(self.commit_update(pin, Origin::Local))
    }

    pub fn delete_pin(&mut self, id: &str) -> MutationOutcome {
        self.commit_delete(id, Origin::Local)
    }

    pub fn delete_last_pin(&mut self) -> Option<Pin> {
        let pin = self.repository.delete_last()?;
        tracing::debug!(pin_id = %pin.id, "Last pin deleted");
        self.after_commit(ActionKind::DeletePin, &pin, Origin::Local);
        Some(pin)
    }

    /// Drops every pin on this client only.
    pub fn reset(&mut self) {
        self.repository.reset();
        self.selection.select(None);
        self.refresh_view();
    }

    /// Records `client_id` as an attester and broadcasts the edit like any
    /// other local update. Attesting twice changes nothing and sends nothing.
    pub fn attest(&mut self, pin_id: &str, client_id: &str) -> MutationOutcome {
        let Some(mut pin) = self.repository.get_by_id(pin_id).cloned() else {
            return MutationOutcome::IgnoredUnknownId;
        };
        if !consensus::attest(&mut pin, client_id) {
            return MutationOutcome::Unchanged;
        }
        self.commit_update(pin, Origin::Local)
    }

    /// Attests with this client's own identity.
    pub fn attest_self(&mut self, pin_id: &str) -> Result<MutationOutcome> {
        let client_id = self
            .client_id
            .clone()
            .ok_or_else(|| AppError::InvalidParams("Client identity not assigned".into()))?;
        Ok(self.attest(pin_id, &client_id))
    }

    pub fn is_attested_by(&self, pin_id: &str, client_id: &str) -> bool {
        self.get_by_id(pin_id)
            .is_some_and(|pin| consensus::is_attested_by(pin, client_id))
    }

    fn append_chat(&mut self, pin_id: &str, message: ChatMessage) -> MutationOutcome {
        let (outcome, pin) = self.repository.modify(pin_id, |pin| {
            pin.messages.push(message);
            true
        });
        if let Some(pin) = pin {
            self.selection.on_pin_mutated(&pin);
            self.refresh_view();
        }
        outcome
    }

    pub fn send_chat(&mut self, pin_id: &str, content: &str) -> Result<MutationOutcome> {
        validate_chat_content(&self.config, content)?;
        let client_id = self
            .client_id
            .clone()
            .ok_or_else(|| AppError::InvalidParams("Client identity not assigned".into()))?;

        let outcome = self.append_chat(
            pin_id,
            ChatMessage {
                sender: client_id.clone(),
                content: content.to_string(),
            },
        );
        if outcome.is_applied() {
            self.send(WireMessage::Chat {
                pin_id: pin_id.to_string(),
                sender_id: client_id,
                content: content.to_string(),
            });
        }
        Ok(outcome)
    }

    /// Parses and applies one inbound frame. Malformed or rejected frames are
    /// logged and leave state untouched.
    pub fn apply_inbound(&mut self, text: &str) -> Result<MutationOutcome> {
        let message = WireMessage::parse(text).inspect_err(|error| {
            tracing::warn!(error = %error, "Dropping malformed message");
        })?;
        let kind = message.kind();
        self.apply_message(message).inspect_err(|error| {
            tracing::warn!(error = %error, kind, "Dropping rejected message");
        })
    }

    pub fn apply_message(&mut self, message: WireMessage) -> Result<MutationOutcome> {
        if let (Some(sender_id), Some(client_id)) = (message.sender_id(), self.client_id())
            && sender_id == client_id
        {
            tracing::debug!(kind = message.kind(), "Ignoring our own update");
            return Ok(MutationOutcome::Unchanged);
        }

        match message {
            WireMessage::Initialization {
                pins,
                nb_of_users,
                minimal_nb_of_validations,
                client_id,
            } => {
                self.initialize(pins, nb_of_users, minimal_nb_of_validations, client_id);
                Ok(MutationOutcome::Applied)
            }
            WireMessage::AddPin { pin, .. } => {
                validate_pin(&self.config, &pin)?;
                self.commit_add(pin, Origin::Remote)?;
                Ok(MutationOutcome::Applied)
            }
            WireMessage::UpdatePin { pin, .. } => {
                validate_pin(&self.config, &pin)?;
                Ok(self.commit_update(pin, Origin::Remote))
            }
            WireMessage::DeletePin { pin, .. } => Ok(self.commit_delete(&pin.id, Origin::Remote)),
            WireMessage::UsersChange {
                nb_of_users,
                minimal_nb_of_validations,
            } => {
                self.users = UsersState {
                    nb_of_users,
                    minimal_nb_of_validations,
                };
                self.refresh_view();
                Ok(MutationOutcome::Applied)
            }
            WireMessage::Chat {
                pin_id,
                sender_id,
                content,
            } => {
                validate_chat_content(&self.config, &content)?;
                Ok(self.append_chat(
                    &pin_id,
                    ChatMessage {
                        sender: sender_id,
                        content,
                    },
                ))
            }
        }
    }

    fn initialize(
        &mut self,
        pins: Vec<Pin>,
        nb_of_users: usize,
        minimal_nb_of_validations: usize,
        client_id: ClientId,
    ) {
        let pins: Vec<Pin> = pins
            .into_iter()
            .filter(|pin| match validate_pin(&self.config, pin) {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(pin_id = %pin.id, error = %error, "Dropping invalid pin");
                    false
                }
            })
            .collect();

        self.repository.replace_all(pins);
        self.users = UsersState {
            nb_of_users,
            minimal_nb_of_validations,
        };
        tracing::info!(client_id = %client_id, pins = self.repository.len(), "Board initialized");
        self.client_id = Some(client_id);

        if let Some(selected) = self.selection.selected().map(|pin| pin.id.clone()) {
            match self.repository.get_by_id(&selected).cloned() {
                Some(pin) => self.selection.on_pin_mutated(&pin),
                None => self.selection.on_pin_deleted(&selected),
            }
        }

        self.refresh_view();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;

    fn connected(client_id: &str, minimal: usize) -> (BoardClient, UnboundedReceiver<WireMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut client = BoardClient::default();
        client.connect(tx);
        client
            .apply_message(WireMessage::Initialization {
                pins: vec![],
                nb_of_users: 2,
                minimal_nb_of_validations: minimal,
                client_id: client_id.into(),
            })
            .unwrap();
        (client, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<WireMessage>) -> Vec<WireMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[test]
    fn local_mutations_stay_local_without_identity() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut client = BoardClient::default();
        client.connect(tx);

        let pin = Pin::new(0.0, 0.0);
        client.add_pin(pin.clone()).unwrap();

        assert!(drain(&mut rx).is_empty());
        assert_eq!(client.pins().len(), 1);
        assert!(client.get_by_id(&pin.id).unwrap().validated_by.is_empty());
    }

    #[test]
    fn local_mutations_stay_local_without_channel() {
        let mut client = BoardClient::default();
        client
            .apply_message(WireMessage::Initialization {
                pins: vec![],
                nb_of_users: 1,
                minimal_nb_of_validations: 1,
                client_id: "me".into(),
            })
            .unwrap();

        let pin = Pin::new(0.0, 0.0);
        client.add_pin(pin.clone()).unwrap();
        assert!(!client.send_update(ActionKind::UpdatePin, &pin));
        assert_eq!(client.pins().len(), 1);
    }

    #[test]
    fn each_local_mutation_sends_one_message() {
        let (mut client, mut rx) = connected("me", 1);
        let pin = Pin::new(0.0, 0.0);

        client.add_pin(pin.clone()).unwrap();
        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            WireMessage::AddPin { sender_id, pin: sent_pin } => {
                assert_eq!(sender_id, "me");
                assert_eq!(sent_pin.validated_by, vec!["me".to_string()]);
                assert_eq!(sent_pin.status, PinStatus::Validated);
            }
            other => panic!("unexpected {other:?}"),
        }

        let moved = Pin {
            position_x: 50.0,
            ..client.get_by_id(&pin.id).unwrap().clone()
        };
        assert_eq!(client.update_pin(moved).unwrap(), MutationOutcome::Applied);
        assert!(matches!(drain(&mut rx).as_slice(), [WireMessage::UpdatePin { .. }]));

        assert_eq!(client.delete_pin(&pin.id), MutationOutcome::Applied);
        assert!(matches!(drain(&mut rx).as_slice(), [WireMessage::DeletePin { .. }]));
    }

    #[test]
    fn unknown_ids_neither_mutate_nor_send() {
        let (mut client, mut rx) = connected("me", 1);

        assert_eq!(
            client.update_pin(Pin::new(1.0, 1.0)).unwrap(),
            MutationOutcome::IgnoredUnknownId
        );
        assert_eq!(client.delete_pin("ghost"), MutationOutcome::IgnoredUnknownId);
        assert_eq!(client.attest("ghost", "me"), MutationOutcome::IgnoredUnknownId);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn delete_last_broadcasts_the_removed_pin() {
        let (mut client, mut rx) = connected("me", 1);
        let first = Pin::new(0.0, 0.0);
        let second = Pin::new(500.0, 0.0);
        client.add_pin(first).unwrap();
        client.add_pin(second.clone()).unwrap();
        drain(&mut rx);

        assert_eq!(client.delete_last_pin().unwrap().id, second.id);
        match drain(&mut rx).as_slice() {
            [WireMessage::DeletePin { pin, .. }] => assert_eq!(pin.id, second.id),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(client.display().pins.len(), 1);

        client.reset();
        assert!(client.pins().is_empty());
        assert!(client.display().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn inbound_mutations_are_never_echoed() {
        let (mut client, mut rx) = connected("me", 1);
        let pin = Pin::new(0.0, 0.0);

        client
            .apply_message(WireMessage::AddPin {
                sender_id: "peer".into(),
                pin: pin.clone(),
            })
            .unwrap();
        client
            .apply_message(WireMessage::UpdatePin {
                sender_id: "peer".into(),
                pin: pin.clone().with_name("renamed"),
            })
            .unwrap();
        assert_eq!(client.get_by_id(&pin.id).unwrap().name.as_deref(), Some("renamed"));

        client
            .apply_message(WireMessage::DeletePin {
                sender_id: "peer".into(),
                pin: pin.clone(),
            })
            .unwrap();

        assert!(client.pins().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn inbound_attestation_does_not_trigger_another_attestation() {
        let (mut client, mut rx) = connected("me", 2);
        let mut pin = Pin::new(0.0, 0.0);
        client
            .apply_message(WireMessage::AddPin {
                sender_id: "peer".into(),
                pin: pin.clone(),
            })
            .unwrap();

        consensus::attest(&mut pin, "peer");
        client
            .apply_message(WireMessage::UpdatePin {
                sender_id: "peer".into(),
                pin,
            })
            .unwrap();

        assert!(drain(&mut rx).is_empty());
        assert_eq!(client.pins()[0].validated_by, vec!["peer".to_string()]);
    }

    #[test]
    fn attestation_promotes_at_quorum_and_is_idempotent() {
        let (mut client, mut rx) = connected("me", 2);
        let pin = Pin::new(0.0, 0.0);
        client
            .apply_message(WireMessage::AddPin {
                sender_id: "peer".into(),
                pin: pin.clone(),
            })
            .unwrap();

        assert_eq!(client.attest_self(&pin.id).unwrap(), MutationOutcome::Applied);
        assert_eq!(client.pin_status(&pin.id), Some(PinStatus::Pending));
        assert_eq!(drain(&mut rx).len(), 1);

        assert_eq!(client.attest_self(&pin.id).unwrap(), MutationOutcome::Unchanged);
        assert!(drain(&mut rx).is_empty());

        assert_eq!(client.attest(&pin.id, "peer"), MutationOutcome::Applied);
        assert_eq!(client.pin_status(&pin.id), Some(PinStatus::Validated));
        assert!(client.is_attested_by(&pin.id, "peer"));
        assert_eq!(client.display().pins[0].status, PinStatus::Validated);
    }

    #[test]
    fn quorum_change_reclassifies_without_touching_pins() {
        let (mut client, _rx) = connected("me", 1);
        let pin = Pin::new(0.0, 0.0);
        client.add_pin(pin.clone()).unwrap();
        assert_eq!(client.pin_status(&pin.id), Some(PinStatus::Validated));

        client
            .apply_message(WireMessage::UsersChange {
                nb_of_users: 4,
                minimal_nb_of_validations: 2,
            })
            .unwrap();

        assert_eq!(client.users().nb_of_users, 4);
        assert_eq!(client.pin_status(&pin.id), Some(PinStatus::Pending));
        assert_eq!(client.display().pins[0].status, PinStatus::Pending);
        assert_eq!(client.pins()[0].validated_by.len(), 1);
    }

    #[test]
    fn stored_and_selected_status_follow_the_quorum() {
        let (mut client, _rx) = connected("me", 1);
        let pin = Pin::new(0.0, 0.0);
        client.add_pin(pin.clone()).unwrap();
        client.select(client.get_by_id(&pin.id).cloned());

        assert_eq!(client.pin_status(&pin.id), Some(PinStatus::Validated));
        assert_eq!(client.get_by_id(&pin.id).unwrap().status, PinStatus::Validated);
        assert_eq!(client.pins()[0].status, PinStatus::Validated);
        assert_eq!(client.selected().unwrap().status, PinStatus::Validated);

        client
            .apply_message(WireMessage::UsersChange {
                nb_of_users: 4,
                minimal_nb_of_validations: 2,
            })
            .unwrap();

        assert_eq!(client.pin_status(&pin.id), Some(PinStatus::Pending));
        assert_eq!(client.get_by_id(&pin.id).unwrap().status, PinStatus::Pending);
        assert_eq!(client.selected().unwrap().status, PinStatus::Pending);
    }

    #[test]
    fn inbound_status_is_replaced_by_the_local_quorum() {
        let (mut client, _rx) = connected("me", 3);
        let pin = Pin {
            status: PinStatus::Validated,
            ..Pin::new(0.0, 0.0)
        };
        client
            .apply_message(WireMessage::AddPin {
                sender_id: "peer".into(),
                pin: pin.clone(),
            })
            .unwrap();

        assert_eq!(client.get_by_id(&pin.id).unwrap().status, PinStatus::Pending);
        assert_eq!(client.display().pins[0].status, PinStatus::Pending);
    }

    #[test]
    fn local_deletes_clear_the_selection() {
        let (mut client, _rx) = connected("me", 1);
        let first = Pin::new(0.0, 0.0);
        let second = Pin::new(500.0, 0.0);
        client.add_pin(first.clone()).unwrap();
        client.add_pin(second.clone()).unwrap();

        client.select(client.get_by_id(&first.id).cloned());
        client.delete_pin(&second.id);
        assert_eq!(client.selected().unwrap().id, first.id);
        client.delete_pin(&first.id);
        assert!(client.selected().is_none());

        client.add_pin(second.clone()).unwrap();
        client.select(client.get_by_id(&second.id).cloned());
        client.delete_last_pin();
        assert!(client.selected().is_none());
    }

    #[test]
    fn initialization_replaces_pins_and_assigns_identity() {
        let mut client = BoardClient::default();
        client.add_pin(Pin::new(900.0, 900.0)).unwrap();
        let kept = Pin::new(0.0, 0.0);

        client
            .apply_message(WireMessage::Initialization {
                pins: vec![kept.clone(), Pin::new(10.0, 0.0), Pin::new(f64::NAN, 0.0)],
                nb_of_users: 3,
                minimal_nb_of_validations: 2,
                client_id: "assigned".into(),
            })
            .unwrap();

        assert_eq!(client.client_id(), Some("assigned"));
        assert_eq!(client.pins().len(), 2);
        assert_eq!(client.pins()[0].id, kept.id);
        assert_eq!(client.display().clusters.len(), 1);
        assert_eq!(client.users().minimal_nb_of_validations, 2);
    }

    #[test]
    fn malformed_frames_are_dropped() {
        let (mut client, mut rx) = connected("me", 1);
        client.add_pin(Pin::new(0.0, 0.0)).unwrap();
        drain(&mut rx);

        assert!(client.apply_inbound(r#"{"type":"addPin","senderId":"peer"}"#).is_err());
        assert!(client.apply_inbound("{{{").is_err());
        let bad_size = r#"{"type":"addPin","senderId":"peer","pin":{"id":"x","positionX":0,"positionY":0,"size":-1}}"#;
        assert!(client.apply_inbound(bad_size).is_err());

        assert_eq!(client.pins().len(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn duplicate_remote_add_is_rejected() {
        let (mut client, _rx) = connected("me", 1);
        let pin = Pin::new(0.0, 0.0);
        let add = WireMessage::AddPin {
            sender_id: "peer".into(),
            pin: pin.clone(),
        };
        client.apply_message(add.clone()).unwrap();

        assert!(matches!(
            client.apply_message(add),
            Err(AppError::PinAlreadyExists(id)) if id == pin.id
        ));
        assert_eq!(client.pins().len(), 1);
    }

    #[test]
    fn own_updates_reflected_back_are_ignored() {
        let (mut client, _rx) = connected("me", 1);
        let outcome = client
            .apply_message(WireMessage::AddPin {
                sender_id: "me".into(),
                pin: Pin::new(0.0, 0.0),
            })
            .unwrap();

        assert_eq!(outcome, MutationOutcome::Unchanged);
        assert!(client.pins().is_empty());
    }

    #[test]
    fn remote_edits_refresh_the_selection() {
        let (mut client, _rx) = connected("me", 1);
        let pin = Pin::new(0.0, 0.0);
        client
            .apply_message(WireMessage::AddPin {
                sender_id: "peer".into(),
                pin: pin.clone(),
            })
            .unwrap();
        client.select(client.get_by_id(&pin.id).cloned());

        client
            .apply_message(WireMessage::UpdatePin {
                sender_id: "peer".into(),
                pin: pin.clone().with_name("fresh"),
            })
            .unwrap();
        assert_eq!(client.selected().unwrap().name.as_deref(), Some("fresh"));

        client
            .apply_message(WireMessage::DeletePin {
                sender_id: "peer".into(),
                pin,
            })
            .unwrap();
        assert!(client.selected().is_none());
    }

    #[test]
    fn chat_appends_and_sends() {
        let (mut client, mut rx) = connected("me", 1);
        let pin = Pin::new(0.0, 0.0);
        client.add_pin(pin.clone()).unwrap();
        drain(&mut rx);

        assert_eq!(client.send_chat(&pin.id, "hello").unwrap(), MutationOutcome::Applied);
        match drain(&mut rx).as_slice() {
            [WireMessage::Chat { pin_id, sender_id, content }] => {
                assert_eq!(pin_id, &pin.id);
                assert_eq!(sender_id, "me");
                assert_eq!(content, "hello");
            }
            other => panic!("unexpected {other:?}"),
        }

        client
            .apply_message(WireMessage::Chat {
                pin_id: pin.id.clone(),
                sender_id: "peer".into(),
                content: "hi back".into(),
            })
            .unwrap();
        assert!(drain(&mut rx).is_empty());

        let messages = &client.get_by_id(&pin.id).unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, "peer");

        assert_eq!(
            client.send_chat("ghost", "anyone?").unwrap(),
            MutationOutcome::IgnoredUnknownId
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn zoom_drives_clustering_and_hit_testing() {
        let mut client = BoardClient::default();
        client.add_pin(Pin::new(0.0, 0.0)).unwrap();
        client.add_pin(Pin::new(10.0, 0.0)).unwrap();
        assert_eq!(client.display().clusters.len(), 1);
        assert!(client.get_pin_at_coordinates(0.0, -1.0).is_none());
        assert!(matches!(client.marker_at(5.0, -1.0), Some(Marker::Cluster(_))));

        client.set_zoom(10.0).unwrap();
        assert!(client.display().clusters.is_empty());
        assert_eq!(client.display().pins.len(), 2);
        assert!(client.get_pin_at_coordinates(0.0, -1.0).is_some());

        assert!(client.set_zoom(0.0).is_err());
        assert_eq!(client.zoom_factor(), 10.0);
    }
}
