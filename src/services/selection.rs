use crate::services::pin::Pin;

/// The pin the UI currently has focused, kept in step with remote edits.
#[derive(Debug, Clone, Default)]
pub struct SelectionMirror {
    selected: Option<Pin>,
}

impl SelectionMirror {
    pub fn selected(&self) -> Option<&Pin> {
        self.selected.as_ref()
    }

    pub(crate) fn selected_mut(&mut self) -> Option<&mut Pin> {
        self.selected.as_mut()
    }

    pub fn select(&mut self, pin: Option<Pin>) {
        self.selected = pin;
    }

    fn is_selected(&self, id: &str) -> bool {
        self.selected.as_ref().is_some_and(|pin| pin.id == id)
    }

    pub fn on_pin_mutated(&mut self, pin: &Pin) {
        if self.is_selected(&pin.id) {
            self.selected = Some(pin.clone());
        }
    }

    pub fn on_pin_deleted(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selected = None;
        }
    }
}
