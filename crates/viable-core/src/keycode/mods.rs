//! 8-bit modifier masks in HID report order.

use serde::{Deserialize, Serialize};

/// Modifier bitmask, laid out like the first byte of a HID boot keyboard
/// report: left Ctrl/Shift/Alt/GUI in bits 0-3, right-hand variants in 4-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModMask(pub u8);

impl ModMask {
    pub const NONE: ModMask = ModMask(0);
    pub const LCTL: ModMask = ModMask(1 << 0);
    pub const LSFT: ModMask = ModMask(1 << 1);
    pub const LALT: ModMask = ModMask(1 << 2);
    pub const LGUI: ModMask = ModMask(1 << 3);
    pub const RCTL: ModMask = ModMask(1 << 4);
    pub const RSFT: ModMask = ModMask(1 << 5);
    pub const RALT: ModMask = ModMask(1 << 6);
    pub const RGUI: ModMask = ModMask(1 << 7);

    /// Left/right pairs in Ctrl, Shift, Alt, GUI order.
    const PAIRS: [(ModMask, ModMask); 4] = [
        (Self::LCTL, Self::RCTL),
        (Self::LSFT, Self::RSFT),
        (Self::LALT, Self::RALT),
        (Self::LGUI, Self::RGUI),
    ];

    /// Returns `true` if no modifier is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is also set in `self`.
    pub const fn contains(self, other: ModMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if `self` and `other` share at least one bit.
    pub const fn intersects(self, other: ModMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Folds every right-hand modifier onto its left-hand counterpart.
    ///
    /// `RSFT | LCTL` becomes `LSFT | LCTL`; holding both shifts still yields a
    /// single `LSFT`.
    pub fn collapse_handedness(self) -> ModMask {
        let mut out = self.0;
        for (left, right) in Self::PAIRS {
            if out & (left.0 | right.0) != 0 {
                out = (out & !(left.0 | right.0)) | left.0;
            }
        }
        ModMask(out)
    }
}

impl std::ops::BitOr for ModMask {
    type Output = ModMask;

    fn bitor(self, rhs: ModMask) -> ModMask {
        ModMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ModMask {
    fn bitor_assign(&mut self, rhs: ModMask) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for ModMask {
    type Output = ModMask;

    fn bitand(self, rhs: ModMask) -> ModMask {
        ModMask(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_maps_right_shift_to_left_shift() {
        assert_eq!(ModMask::RSFT.collapse_handedness(), ModMask::LSFT);
    }

    #[test]
    fn test_collapse_keeps_left_mods_and_merges_pairs() {
        let held = ModMask::LSFT | ModMask::RSFT | ModMask::RGUI | ModMask::LCTL;
        assert_eq!(
            held.collapse_handedness(),
            ModMask::LSFT | ModMask::LGUI | ModMask::LCTL
        );
    }

    #[test]
    fn test_contains_is_subset_check() {
        let held = ModMask::LSFT | ModMask::LCTL;
        assert!(held.contains(ModMask::LSFT));
        assert!(held.contains(ModMask::NONE));
        assert!(!ModMask::LSFT.contains(held));
    }
}
