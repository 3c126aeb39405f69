//! Key override engine.
//!
//! Supplies the override set to the key processing layer.  The activation
//! options are carried through untouched; applying them (when to register
//! the replacement, when to restore the trigger) is the processor's job.

use tracing::debug;

use crate::domain::{KeyOverrideEntry, KeyOverrideOptions};
use crate::keycode::{Keycode, ModMask};
use crate::storage::{Storage, StoreError, ViableStore};

#[derive(Debug, Default)]
pub struct KeyOverrideEngine {
    entries: Vec<KeyOverrideEntry>,
}

impl KeyOverrideEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reload<S: Storage>(&mut self, store: &ViableStore<S>) -> Result<(), StoreError> {
        self.entries = store.entries::<KeyOverrideEntry>()?;
        debug!(
            enabled = self.entries.iter().filter(|e| e.options.enabled()).count(),
            "key override table reloaded"
        );
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Slot `index`, enabled or not.
    pub fn get(&self, index: usize) -> Option<&KeyOverrideEntry> {
        self.entries.get(index)
    }

    /// Enabled overrides with their slot index, in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = (usize, &KeyOverrideEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.options.enabled())
    }

    /// First enabled override whose trigger, layer and modifier conditions
    /// hold for `keycode` pressed on `layer` with `mods` held.
    ///
    /// Required mods must all be held, or any one of them with the one-mod
    /// option.  No negative mod may be held.
    pub fn find_match(&self, keycode: Keycode, layer: u8, mods: ModMask) -> Option<usize> {
        self.enabled()
            .find(|(_, e)| {
                e.trigger == keycode
                    && layer < 32
                    && e.layers & (1u32 << layer) != 0
                    && required_mods_held(e, mods)
                    && !mods.intersects(e.negative_mod_mask)
            })
            .map(|(i, _)| i)
    }
}

fn required_mods_held(entry: &KeyOverrideEntry, mods: ModMask) -> bool {
    if entry.trigger_mods.is_empty() {
        return true;
    }
    if entry.options.has(KeyOverrideOptions::ONE_MOD) {
        mods.intersects(entry.trigger_mods)
    } else {
        mods.contains(entry.trigger_mods)
    }
}
