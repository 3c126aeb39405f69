//! Keycodes and modifier masks as they appear in stored entries and on the wire.
//!
//! Every key action referenced by a table entry is a 16-bit QMK keycode.  The
//! low range (`0x0000..=0x00FF`) holds plain USB HID usages, the range up to
//! [`ranges::QK_MODS_MAX`] holds "modded" basic keys, and everything above is
//! a firmware-specific action (layer keys, tap dance, macros, ...).

pub mod hid;
pub mod mods;

pub use mods::ModMask;

use serde::{Deserialize, Serialize};

/// Well-known keycode ranges.
pub mod ranges {
    /// Highest plain HID usage.
    pub const QK_BASIC_MAX: u16 = 0x00FF;
    /// First keycode of the "basic key + modifiers" range.
    pub const QK_MODS: u16 = 0x0100;
    /// Last keycode that can be registered directly as a (modded) basic key.
    pub const QK_MODS_MAX: u16 = 0x1FFF;
    /// First tap-dance keycode; the low byte is the tap-dance slot.
    pub const QK_TAP_DANCE: u16 = 0x5700;
    /// Last tap-dance keycode.
    pub const QK_TAP_DANCE_MAX: u16 = 0x57FF;
}

/// A 16-bit key action identifier.
///
/// `Keycode::NO` (0x0000) is the null action: an unused slot in a combo
/// trigger list, the terminator of a leader sequence, and the "no match"
/// result of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keycode(pub u16);

impl Keycode {
    /// The null action.
    pub const NO: Keycode = Keycode(0x0000);
    /// Falls through to the next active layer.
    pub const TRANSPARENT: Keycode = Keycode(0x0001);

    /// Returns the raw 16-bit value.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns `true` for the null action.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` for a plain HID usage with no modifiers attached.
    pub const fn is_basic(self) -> bool {
        self.0 <= ranges::QK_BASIC_MAX
    }

    /// Returns `true` if this keycode can be registered directly as a
    /// (possibly modded) basic key rather than dispatched as an action.
    pub const fn is_registrable(self) -> bool {
        self.0 <= ranges::QK_MODS_MAX
    }

    /// Returns the tap-dance slot for `TD(n)` keycodes.
    pub fn tap_dance_index(self) -> Option<u8> {
        if (ranges::QK_TAP_DANCE..=ranges::QK_TAP_DANCE_MAX).contains(&self.0) {
            Some((self.0 & 0x00FF) as u8)
        } else {
            None
        }
    }

    /// Builds the `TD(n)` keycode for tap-dance slot `index`.
    pub const fn tap_dance(index: u8) -> Keycode {
        Keycode(ranges::QK_TAP_DANCE | index as u16)
    }

    /// Modifiers packed into a modded basic keycode (`LSFT(KC_A)` etc.).
    ///
    /// Bits 8-11 select Ctrl/Shift/Alt/GUI and bit 12 selects the right-hand
    /// variant for all of them.
    pub fn embedded_mods(self) -> ModMask {
        if !(ranges::QK_MODS..=ranges::QK_MODS_MAX).contains(&self.0) {
            return ModMask::NONE;
        }
        let bits = ((self.0 >> 8) & 0x0F) as u8;
        if self.0 & 0x1000 != 0 {
            ModMask(bits << 4)
        } else {
            ModMask(bits)
        }
    }

    /// The basic HID usage with any embedded modifiers stripped.
    pub const fn basic(self) -> Keycode {
        if self.0 <= ranges::QK_MODS_MAX {
            Keycode(self.0 & 0x00FF)
        } else {
            self
        }
    }
}

impl From<u16> for Keycode {
    fn from(value: u16) -> Self {
        Keycode(value)
    }
}

impl From<Keycode> for u16 {
    fn from(value: Keycode) -> Self {
        value.0
    }
}

impl std::fmt::Display for Keycode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
