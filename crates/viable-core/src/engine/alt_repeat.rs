//! Alternate repeat key engine.

use tracing::debug;

use crate::domain::{AltRepeatKeyEntry, AltRepeatOptions};
use crate::keycode::{Keycode, ModMask};
use crate::storage::{Storage, StoreError, ViableStore};

#[derive(Debug, Default)]
pub struct AltRepeatEngine {
    entries: Vec<AltRepeatKeyEntry>,
}

impl AltRepeatEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reload<S: Storage>(&mut self, store: &ViableStore<S>) -> Result<(), StoreError> {
        self.entries = store.entries::<AltRepeatKeyEntry>()?;
        debug!(
            enabled = self.entries.iter().filter(|e| e.options.enabled()).count(),
            "alt repeat table reloaded"
        );
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    fn enabled(&self) -> impl Iterator<Item = &AltRepeatKeyEntry> {
        self.entries.iter().filter(|e| e.options.enabled())
    }

    /// Alternate output for `keycode` last pressed with `mods` held.
    ///
    /// The entry's allowed mods must be a subset of `mods` (after folding
    /// right-hand modifiers onto the left when the entry ignores handedness).
    /// Returns [`Keycode::NO`] when no enabled entry matches.
    pub fn lookup(&self, keycode: Keycode, mods: ModMask) -> Keycode {
        self.enabled()
            .filter(|e| e.keycode == keycode)
            .find(|e| {
                let held = if e.options.has(AltRepeatOptions::IGNORE_MOD_HANDEDNESS) {
                    mods.collapse_handedness()
                } else {
                    mods
                };
                held.contains(e.allowed_mods)
            })
            .map(|e| {
                if e.options.has(AltRepeatOptions::DEFAULT_TO_ALT) {
                    e.keycode
                } else {
                    e.alt_keycode
                }
            })
            .unwrap_or(Keycode::NO)
    }

    /// Reverse direction for bidirectional entries: given the alternate
    /// keycode, the original.  Returns [`Keycode::NO`] when none matches.
    pub fn reverse_lookup(&self, keycode: Keycode) -> Keycode {
        self.enabled()
            .find(|e| e.options.has(AltRepeatOptions::BIDIRECTIONAL) && e.alt_keycode == keycode)
            .map(|e| e.keycode)
            .unwrap_or(Keycode::NO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::hid::*;
    use crate::storage::{Capacities, Layout, MemoryStorage};

    fn build(entries: &[AltRepeatKeyEntry]) -> AltRepeatEngine {
        let layout = Layout::new(Capacities {
            alt_repeat_key: 4,
            ..Capacities::default()
        });
        let mut store =
            ViableStore::new(MemoryStorage::new(layout.total_size()), layout).unwrap();
        for (i, entry) in entries.iter().enumerate() {
            store.set(i, entry).unwrap();
        }
        let mut engine = AltRepeatEngine::new();
        engine.reload(&store).unwrap();
        engine
    }

    fn entry(options: u8, allowed: ModMask) -> AltRepeatKeyEntry {
        AltRepeatKeyEntry {
            keycode: KC_LEFT,
            alt_keycode: KC_RIGHT,
            allowed_mods: allowed,
            options: AltRepeatOptions(AltRepeatOptions::ENABLED | options),
        }
    }

    #[test]
    fn test_ignore_handedness_matches_right_shift_against_left_shift() {
        let engine = build(&[entry(AltRepeatOptions::IGNORE_MOD_HANDEDNESS, ModMask::LSFT)]);
        assert_eq!(engine.lookup(KC_LEFT, ModMask::RSFT), KC_RIGHT);
    }

    #[test]
    fn test_handedness_matters_without_option() {
        let engine = build(&[entry(0, ModMask::LSFT)]);
        assert_eq!(engine.lookup(KC_LEFT, ModMask::RSFT), Keycode::NO);
        assert_eq!(engine.lookup(KC_LEFT, ModMask::LSFT | ModMask::LCTL), KC_RIGHT);
    }

    #[test]
    fn test_default_to_alt_returns_original_keycode() {
        let engine = build(&[entry(AltRepeatOptions::DEFAULT_TO_ALT, ModMask::NONE)]);
        assert_eq!(engine.lookup(KC_LEFT, ModMask::NONE), KC_LEFT);
    }

    #[test]
    fn test_disabled_entry_never_matches() {
        let mut disabled = entry(0, ModMask::NONE);
        disabled.options = AltRepeatOptions(0);
        let engine = build(&[disabled]);
        assert_eq!(engine.lookup(KC_LEFT, ModMask::NONE), Keycode::NO);
    }

    #[test]
    fn test_reverse_lookup_only_for_bidirectional() {
        let engine = build(&[entry(0, ModMask::NONE)]);
        assert_eq!(engine.reverse_lookup(KC_RIGHT), Keycode::NO);

        let engine = build(&[entry(AltRepeatOptions::BIDIRECTIONAL, ModMask::NONE)]);
        assert_eq!(engine.reverse_lookup(KC_RIGHT), KC_LEFT);
    }
}
