use crate::error::{AppError, Result};

pub mod types;
pub mod validation;

pub use types::*;

/// Ordered in-memory pin list for one board. Ids are unique at all times.
///
/// The repository only owns the list; recomputing derived display state after
/// a commit is the caller's job.
#[derive(Debug, Default, Clone)]
pub struct PinRepository {
    pins: Vec<Pin>,
}

impl PinRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from a full snapshot, keeping the first pin of any
    /// duplicated id.
    pub fn from_snapshot(pins: Vec<Pin>) -> Self {
        let mut repository = Self::new();
        for pin in pins {
            if let Err(error) = repository.add(pin) {
                tracing::warn!(error = %error, "Dropping duplicate pin from snapshot");
            }
        }
        repository
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get_by_id(id).is_some()
    }

    pub fn add(&mut self, pin: Pin) -> Result<()> {
        if self.contains(&pin.id) {
            return Err(AppError::PinAlreadyExists(pin.id));
        }
        self.pins.push(pin);
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> MutationOutcome {
        match self.pins.iter().position(|pin| pin.id == id) {
            Some(index) => {
                self.pins.remove(index);
                MutationOutcome::Applied
            }
            None => MutationOutcome::IgnoredUnknownId,
        }
    }

    /// Replaces the pin with the same id in place, keeping its position in
    /// the list.
    pub fn update(&mut self, pin: Pin) -> MutationOutcome {
        match self.pins.iter_mut().find(|existing| existing.id == pin.id) {
            Some(existing) => {
                *existing = pin;
                MutationOutcome::Applied
            }
            None => MutationOutcome::IgnoredUnknownId,
        }
    }

    /// Edits a pin in place. The closure returns whether it changed anything.
    pub fn modify<F>(&mut self, id: &str, edit: F) -> (MutationOutcome, Option<Pin>)
    where
        F: FnOnce(&mut Pin) -> bool,
    {
        match self.pins.iter_mut().find(|pin| pin.id == id) {
            Some(pin) => {
                if edit(pin) {
                    (MutationOutcome::Applied, Some(pin.clone()))
                } else {
                    (MutationOutcome::Unchanged, None)
                }
            }
            None => (MutationOutcome::IgnoredUnknownId, None),
        }
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Pin> {
        self.pins.iter_mut()
    }

    pub fn delete_last(&mut self) -> Option<Pin> {
        self.pins.pop()
    }

    pub fn reset(&mut self) {
        self.pins.clear();
    }

    pub fn replace_all(&mut self, pins: Vec<Pin>) {
        *self = Self::from_snapshot(pins);
    }
}
