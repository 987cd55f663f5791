//! Quorum-based validation of pins.
//!
//! A pin is `Validated` once at least `minimal_nb_of_validations` distinct
//! clients have attested it. Status is derived on every read, so a change of
//! quorum reclassifies existing pins immediately.

use serde::{Deserialize, Serialize};

use crate::services::pin::{ClientId, Pin, PinStatus};

/// Connected-client bookkeeping supplied by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersState {
    pub nb_of_users: usize,
    pub minimal_nb_of_validations: usize,
}

impl Default for UsersState {
    fn default() -> Self {
        Self {
            nb_of_users: 1,
            minimal_nb_of_validations: 1,
        }
    }
}

/// Relay-side quorum: `max(1, ceil(nb_of_users × ratio))`.
pub fn minimal_validations(nb_of_users: usize, quorum_ratio: f64) -> usize {
    let required = (nb_of_users as f64 * quorum_ratio).ceil() as usize;
    required.max(1)
}

impl UsersState {
    pub fn for_connections(nb_of_users: usize, quorum_ratio: f64) -> Self {
        Self {
            nb_of_users,
            minimal_nb_of_validations: minimal_validations(nb_of_users, quorum_ratio),
        }
    }
}

pub fn is_attested_by(pin: &Pin, client_id: &str) -> bool {
    pin.validated_by.iter().any(|attester| attester == client_id)
}

/// Records `client_id` as an attester. Returns false if it already was one.
pub fn attest(pin: &mut Pin, client_id: &str) -> bool {
    if is_attested_by(pin, client_id) {
        return false;
    }
    pin.validated_by.push(ClientId::from(client_id));
    true
}

pub fn status(pin: &Pin, minimal_nb_of_validations: usize) -> PinStatus {
    if pin.validated_by.len() >= minimal_nb_of_validations {
        PinStatus::Validated
    } else {
        PinStatus::Pending
    }
}

/// Copy of `pin` with its advertised status refreshed against the quorum.
pub fn stamped(pin: &Pin, minimal_nb_of_validations: usize) -> Pin {
    Pin {
        status: status(pin, minimal_nb_of_validations),
        ..pin.clone()
    }
}
