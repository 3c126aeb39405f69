//! Recording [`KeyActions`] implementation for tests.
//!
//! Stores every press and release in order so tests can assert on the exact
//! sequence an engine produced.

use super::{KeyAction, KeyActions};
use crate::keycode::Keycode;

#[derive(Debug, Clone, Default)]
pub struct RecordingActions {
    events: Vec<KeyAction>,
}

impl RecordingActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[KeyAction] {
        &self.events
    }

    /// Drains the recorded events.
    pub fn take(&mut self) -> Vec<KeyAction> {
        std::mem::take(&mut self.events)
    }

    /// Keycodes currently pressed and not yet released.
    pub fn held(&self) -> Vec<Keycode> {
        let mut held = Vec::new();
        for event in &self.events {
            match *event {
                KeyAction::Press(kc) => held.push(kc),
                KeyAction::Release(kc) => {
                    if let Some(pos) = held.iter().rposition(|&h| h == kc) {
                        held.remove(pos);
                    }
                }
            }
        }
        held
    }
}

impl KeyActions for RecordingActions {
    fn press(&mut self, keycode: Keycode) {
        self.events.push(KeyAction::Press(keycode));
    }

    fn release(&mut self, keycode: Keycode) {
        self.events.push(KeyAction::Release(keycode));
    }
}
