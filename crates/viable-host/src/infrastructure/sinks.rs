//! Stand-ins for the firmware subsystems the core pushes into.
//!
//! On a keyboard these would register keycodes with the HID report and
//! reconfigure auto-shift or mouse keys.  The emulator has no HID stack, so
//! both sinks log what they receive and keep just enough state for the
//! protocol to read back.

use tracing::info;
use viable_core::{KeyActions, KeymapFlags, Keycode, QmkSettings, SettingsSink};

/// Logs every synthesized key event.
#[derive(Debug, Default)]
pub struct TracingActions {
    pub pressed: usize,
}

impl KeyActions for TracingActions {
    fn press(&mut self, keycode: Keycode) {
        self.pressed += 1;
        info!(keycode = %keycode, "press");
    }

    fn release(&mut self, keycode: Keycode) {
        info!(keycode = %keycode, "release");
    }
}

/// Logs applied settings and holds the keymap flags in RAM.
#[derive(Debug, Clone)]
pub struct TracingSettingsSink {
    flags: KeymapFlags,
}

impl TracingSettingsSink {
    pub fn new(nkro: bool) -> Self {
        Self {
            flags: KeymapFlags::factory(nkro),
        }
    }
}

impl SettingsSink for TracingSettingsSink {
    fn apply(&mut self, settings: &QmkSettings) {
        info!(
            tapping_term = settings.tapping_term,
            combo_term = settings.combo_term,
            auto_shift_timeout = settings.auto_shift_timeout,
            "settings applied"
        );
    }

    fn keymap_flags(&self) -> KeymapFlags {
        self.flags
    }

    fn set_keymap_flags(&mut self, flags: KeymapFlags) {
        info!(flags = flags.0, "keymap flags changed");
        self.flags = flags;
    }

    fn clear_keyboard(&mut self) {
        info!("keyboard cleared");
    }
}
