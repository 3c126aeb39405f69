//! Combo engine.
//!
//! Holds the combo table in the shape the combo processor expects: one key
//! list per slot (empty when disabled) plus its output and custom term.  The
//! processor enumerates slots through [`ComboEngine::count`] and
//! [`ComboEngine::get`] and asks for each slot's window via
//! [`ComboEngine::term`].

use tracing::debug;

use super::timing::{resolve_term, BehaviorOverrides};
use crate::domain::ComboEntry;
use crate::keycode::Keycode;
use crate::storage::{Storage, StoreError, ViableStore};

/// One combo slot as seen by the combo processor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Combo {
    /// Trigger keys; empty for a disabled slot.
    pub keys: Vec<Keycode>,
    pub output: Keycode,
    /// Custom window in ms; `0` uses the global combo term.
    pub term: u16,
    entry: ComboEntry,
}

impl Combo {
    fn from_entry(entry: &ComboEntry) -> Self {
        if !entry.custom_term.enabled() {
            return Self {
                entry: *entry,
                ..Self::default()
            };
        }
        Self {
            keys: entry
                .input
                .iter()
                .copied()
                .take_while(|kc| !kc.is_none())
                .collect(),
            output: entry.output,
            term: entry.custom_term.term_ms(),
            entry: *entry,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    /// The stored entry this slot was built from.
    pub fn entry(&self) -> &ComboEntry {
        &self.entry
    }
}

#[derive(Debug, Default)]
pub struct ComboEngine {
    combos: Vec<Combo>,
}

impl ComboEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reload<S: Storage>(&mut self, store: &ViableStore<S>) -> Result<(), StoreError> {
        self.combos = store
            .entries::<ComboEntry>()?
            .iter()
            .map(Combo::from_entry)
            .collect();
        debug!(
            enabled = self.combos.iter().filter(|c| c.is_enabled()).count(),
            "combo table reloaded"
        );
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.combos.len()
    }

    pub fn get(&self, index: usize) -> Option<&Combo> {
        self.combos.get(index)
    }

    /// Combo window for slot `index`: override, then the slot's custom term,
    /// then `global`.
    pub fn term(&self, index: usize, overrides: &dyn BehaviorOverrides, global: u16) -> u16 {
        let Some(combo) = self.combos.get(index) else {
            return global;
        };
        resolve_term(
            overrides.combo_term(index, &combo.entry),
            Some(combo.term),
            global,
        )
    }

    /// Index of the first enabled combo whose trigger set is exactly `pressed`
    /// (in any order).
    pub fn find_exact(&self, pressed: &[Keycode]) -> Option<usize> {
        self.combos.iter().position(|combo| {
            combo.is_enabled()
                && combo.keys.len() == pressed.len()
                && combo.keys.iter().all(|kc| pressed.contains(kc))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CustomTerm;
    use crate::engine::timing::NoOverrides;
    use crate::keycode::hid::*;
    use crate::storage::{Capacities, Layout, MemoryStorage};

    struct ComboOverride;

    impl BehaviorOverrides for ComboOverride {
        fn combo_term(&self, index: usize, _combo: &ComboEntry) -> Option<u16> {
            (index == 0).then_some(99)
        }
    }

    fn build(entries: &[ComboEntry]) -> ComboEngine {
        let layout = Layout::new(Capacities {
            combo: 4,
            ..Capacities::default()
        });
        let mut store =
            ViableStore::new(MemoryStorage::new(layout.total_size()), layout).unwrap();
        for (i, entry) in entries.iter().enumerate() {
            store.set(i, entry).unwrap();
        }
        let mut engine = ComboEngine::new();
        engine.reload(&store).unwrap();
        engine
    }

    fn jk(term: CustomTerm) -> ComboEntry {
        ComboEntry {
            input: [KC_J, KC_K, Keycode::NO, Keycode::NO],
            output: KC_ESCAPE,
            custom_term: term,
        }
    }

    #[test]
    fn test_disabled_combo_has_empty_key_list() {
        let engine = build(&[jk(CustomTerm::new(false, 40))]);

        let combo = engine.get(0).unwrap();

        assert!(combo.keys.is_empty());
        assert_eq!(combo.output, Keycode::NO);
        assert_eq!(engine.count(), 4);
    }

    #[test]
    fn test_enabled_combo_keys_stop_at_first_empty_slot() {
        let engine = build(&[jk(CustomTerm::new(true, 0))]);
        assert_eq!(engine.get(0).unwrap().keys, vec![KC_J, KC_K]);
    }

    #[test]
    fn test_term_precedence() {
        let engine = build(&[
            jk(CustomTerm::new(true, 30)),
            jk(CustomTerm::new(true, 30)),
            jk(CustomTerm::new(true, 0)),
        ]);

        assert_eq!(engine.term(0, &ComboOverride, 50), 99);
        assert_eq!(engine.term(1, &ComboOverride, 50), 30);
        assert_eq!(engine.term(2, &ComboOverride, 50), 50);
        assert_eq!(engine.term(2, &NoOverrides, 50), 50);
    }

    #[test]
    fn test_find_exact_ignores_order_and_disabled() {
        let engine = build(&[jk(CustomTerm::new(false, 0)), jk(CustomTerm::new(true, 0))]);

        assert_eq!(engine.find_exact(&[KC_K, KC_J]), Some(1));
        assert_eq!(engine.find_exact(&[KC_J]), None);
    }
}
