use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{
    RwLock,
    broadcast::{self, Receiver, Sender, error::RecvError},
};

use crate::{
    config::BoardConfig,
    error::{AppError, Result},
    services::{
        consensus::{self, UsersState},
        pin::{
            ChatMessage, MutationOutcome, Pin, PinRepository,
            validation::{validate_chat_content, validate_pin},
        },
    },
    ws::types::{BoardUpdate, WireMessage},
};

/// The single shared board: fan-out channel, connection count and the
/// relay's own copy of the pins used to initialize newcomers.
pub struct BoardRoom {
    sender: Sender<BoardUpdate>,
    connection_count: AtomicUsize,
    config: BoardConfig,
    pins: RwLock<PinRepository>,
}

impl BoardRoom {
    pub fn new(config: BoardConfig) -> Self {
        const BROADCAST_BUFFER_SIZE: usize = 256;

        let (sender, _) = broadcast::channel(BROADCAST_BUFFER_SIZE);
        Self {
            sender,
            connection_count: AtomicUsize::new(0),
            config,
            pins: RwLock::new(PinRepository::new()),
        }
    }

    pub fn get_connection_count(&self) -> usize {
        self.connection_count.load(Ordering::SeqCst)
    }

    pub fn users(&self) -> UsersState {
        UsersState::for_connections(self.get_connection_count(), self.config.quorum_ratio)
    }

    pub fn subscribe(&self) -> Option<Receiver<BoardUpdate>> {
        loop {
            let count = self.connection_count.load(Ordering::SeqCst);
            if count >= self.config.max_clients {
                return None;
            }

            // Atomically increment only if the count hasn't changed
            match self.connection_count.compare_exchange(
                count,
                count + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Some(self.sender.subscribe()),
                Err(_) => continue,
            }
        }
    }

    pub fn unsubscribe(&self) {
        self.connection_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn broadcast(&self, update: BoardUpdate) {
        let _ = self.sender.send(update);
    }

    pub fn broadcast_users(&self) {
        let users = self.users();
        self.broadcast(BoardUpdate {
            origin: None,
            message: WireMessage::UsersChange {
                nb_of_users: users.nb_of_users,
                minimal_nb_of_validations: users.minimal_nb_of_validations,
            },
        });
    }

    pub async fn snapshot(&self) -> Vec<Pin> {
        let quorum = self.users().minimal_nb_of_validations;
        self.pins
            .read()
            .await
            .pins()
            .iter()
            .map(|pin| consensus::stamped(pin, quorum))
            .collect()
    }

    pub async fn initialization(&self, client_id: &str) -> WireMessage {
        let users = self.users();
        WireMessage::Initialization {
            pins: self.snapshot().await,
            nb_of_users: users.nb_of_users,
            minimal_nb_of_validations: users.minimal_nb_of_validations,
            client_id: client_id.to_string(),
        }
    }

    /// Waits for the next update to forward to `client_id`, skipping its own.
    /// A lagged receiver gets a fresh `initialization` in place of the updates
    /// it missed. Returns `None` once the channel is closed.
    pub async fn next_for(
        &self,
        receiver: &mut Receiver<BoardUpdate>,
        client_id: &str,
    ) -> Option<WireMessage> {
        loop {
            match receiver.recv().await {
                Ok(update) if update.origin.as_deref() == Some(client_id) => continue,
                Ok(update) => return Some(update.message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(client_id, skipped, "Receiver lagged, resending board state");
                    return Some(self.initialization(client_id).await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Applies a message from `client_id` to the relay's copy and fans it out
    /// to every other connection. Rejected messages are not forwarded.
    pub async fn apply_client_message(
        &self,
        client_id: &str,
        message: WireMessage,
    ) -> Result<MutationOutcome> {
        if let Some(sender_id) = message.sender_id()
            && sender_id != client_id
        {
            return Err(AppError::SenderMismatch {
                expected: client_id.to_string(),
                actual: sender_id.to_string(),
            });
        }

        let outcome = {
            let mut pins = self.pins.write().await;
            match &message {
                WireMessage::AddPin { pin, .. } => {
                    validate_pin(&self.config, pin)?;
                    pins.add(pin.clone())?;
                    MutationOutcome::Applied
                }
                WireMessage::UpdatePin { pin, .. } => {
                    validate_pin(&self.config, pin)?;
                    pins.update(pin.clone())
                }
                WireMessage::DeletePin { pin, .. } => pins.delete(&pin.id),
                WireMessage::Chat {
                    pin_id,
                    sender_id,
                    content,
                } => {
                    validate_chat_content(&self.config, content)?;
                    let (outcome, _) = pins.modify(pin_id, |pin| {
                        pin.messages.push(ChatMessage {
                            sender: sender_id.clone(),
                            content: content.clone(),
                        });
                        true
                    });
                    outcome
                }
                WireMessage::Initialization { .. } | WireMessage::UsersChange { .. } => {
                    return Err(AppError::UnexpectedMessage(
                        "relay-only message sent by client",
                    ));
                }
            }
        };

        if outcome.is_applied() {
            tracing::debug!(client_id, kind = message.kind(), "Relaying board update");
            self.broadcast(BoardUpdate {
                origin: Some(client_id.to_string()),
                message,
            });
        } else {
            tracing::debug!(client_id, kind = message.kind(), ?outcome, "Update not relayed");
        }

        Ok(outcome)
    }
}
