//! Key-action emission.
//!
//! The engines decide *what* to press; registering the keycode with the HID
//! report (or dispatching a layer/macro action) belongs to the firmware's key
//! processing layer, reached through [`KeyActions`].

pub mod mock;

use crate::keycode::Keycode;

/// Sink for synthesized key presses and releases.
pub trait KeyActions {
    fn press(&mut self, keycode: Keycode);

    fn release(&mut self, keycode: Keycode);

    /// Press followed by release.
    fn tap(&mut self, keycode: Keycode) {
        self.press(keycode);
        self.release(keycode);
    }
}

/// One synthesized event, as recorded by [`mock::RecordingActions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(Keycode),
    Release(Keycode),
}
