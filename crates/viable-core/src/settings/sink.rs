//! Live firmware subsystems that settings are pushed into.

use serde::{Deserialize, Serialize};

use super::record::QmkSettings;

/// Keyboard-wide modifier swap flags (QMK's `keymap_config`).
///
/// Bits 0-9 are exposed through the magic QSID as a 4-byte LE word; higher
/// bits are internal and survive a magic set untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeymapFlags(pub u16);

impl KeymapFlags {
    pub const SWAP_CONTROL_CAPSLOCK: u16 = 1 << 0;
    pub const CAPSLOCK_TO_CONTROL: u16 = 1 << 1;
    pub const SWAP_LALT_LGUI: u16 = 1 << 2;
    pub const SWAP_RALT_RGUI: u16 = 1 << 3;
    pub const NO_GUI: u16 = 1 << 4;
    pub const SWAP_GRAVE_ESC: u16 = 1 << 5;
    pub const SWAP_BACKSLASH_BACKSPACE: u16 = 1 << 6;
    pub const NKRO: u16 = 1 << 7;
    pub const SWAP_LCTL_LGUI: u16 = 1 << 8;
    pub const SWAP_RCTL_RGUI: u16 = 1 << 9;
    pub const ONESHOT_ENABLE: u16 = 1 << 10;

    /// Bits visible on the wire.
    pub const WIRE_MASK: u16 = 0x03FF;

    /// Factory state: every swap off, one-shot on, NKRO as configured.
    pub fn factory(nkro: bool) -> Self {
        let mut raw = Self::ONESHOT_ENABLE;
        if nkro {
            raw |= Self::NKRO;
        }
        KeymapFlags(raw)
    }

    pub fn to_wire(self) -> u32 {
        u32::from(self.0 & Self::WIRE_MASK)
    }

    /// Replaces the wire-visible bits with those of `word`.
    pub fn with_wire(self, word: u32) -> Self {
        let wire = (word as u16) & Self::WIRE_MASK;
        KeymapFlags((self.0 & !Self::WIRE_MASK) | wire)
    }

    pub fn has(self, bit: u16) -> bool {
        self.0 & bit != 0
    }
}

/// Receives settings changes for the subsystems that run outside the core
/// (auto-shift, mouse keys, the keymap config block).
pub trait SettingsSink {
    /// Pushes the current record into the live subsystems.
    fn apply(&mut self, settings: &QmkSettings);

    fn keymap_flags(&self) -> KeymapFlags;

    /// Persists new keymap flags.
    fn set_keymap_flags(&mut self, flags: KeymapFlags);

    /// Releases every held key.  Called before the keymap flags change so an
    /// NKRO switch cannot leave keys stuck.
    fn clear_keyboard(&mut self) {}
}

/// In-memory [`SettingsSink`] that records what it receives.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsSink {
    pub applied: Vec<QmkSettings>,
    pub flags: KeymapFlags,
    pub clears: usize,
}

impl MemorySettingsSink {
    pub fn new(flags: KeymapFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    /// The most recently applied record.
    pub fn last_applied(&self) -> Option<&QmkSettings> {
        self.applied.last()
    }
}

impl SettingsSink for MemorySettingsSink {
    fn apply(&mut self, settings: &QmkSettings) {
        self.applied.push(*settings);
    }

    fn keymap_flags(&self) -> KeymapFlags {
        self.flags
    }

    fn set_keymap_flags(&mut self, flags: KeymapFlags) {
        self.flags = flags;
    }

    fn clear_keyboard(&mut self) {
        self.clears += 1;
    }
}
