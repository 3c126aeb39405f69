//! Runtime matching engines.
//!
//! Each engine keeps a RAM copy of one persistent table in the shape the key
//! processing layer wants to consume.  The copies are caches: after any write
//! to a table the owning engine must be reloaded before the next key event,
//! which [`Engines::reload`] does for exactly the table that changed.

pub mod alt_repeat;
pub mod combo;
pub mod key_override;
pub mod leader;
pub mod tap_dance;
pub mod timing;

pub use alt_repeat::AltRepeatEngine;
pub use combo::{Combo, ComboEngine};
pub use key_override::KeyOverrideEngine;
pub use leader::{LeaderEngine, LeaderSession};
pub use tap_dance::{DanceState, DanceStep, TapDanceEngine};
pub use timing::{resolve_flag, resolve_term, BehaviorOverrides, NoOverrides, TapHold};

use crate::settings::QmkSettings;
use crate::storage::{Storage, StoreError, Table, ViableStore};

/// All five engines, owned together.
#[derive(Debug, Default)]
pub struct Engines {
    pub tap_dance: TapDanceEngine,
    pub combo: ComboEngine,
    pub key_override: KeyOverrideEngine,
    pub alt_repeat: AltRepeatEngine,
    pub leader: LeaderEngine,
}

impl Engines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads every engine from the store.
    pub fn reload_all<S: Storage>(
        &mut self,
        store: &ViableStore<S>,
        settings: &QmkSettings,
    ) -> Result<(), StoreError> {
        self.tap_dance.reload(store)?;
        self.combo.reload(store)?;
        self.key_override.reload(store)?;
        self.alt_repeat.reload(store)?;
        self.leader.reload(store, settings)?;
        Ok(())
    }

    /// Reloads the engine backed by `table`.  Tables with no engine are
    /// ignored.
    pub fn reload<S: Storage>(
        &mut self,
        table: Table,
        store: &ViableStore<S>,
        settings: &QmkSettings,
    ) -> Result<(), StoreError> {
        match table {
            Table::TapDance => self.tap_dance.reload(store),
            Table::Combo => self.combo.reload(store),
            Table::KeyOverride => self.key_override.reload(store),
            Table::AltRepeatKey => self.alt_repeat.reload(store),
            Table::Leader => self.leader.reload(store, settings),
            Table::OneShot | Table::Magic | Table::QmkSettings | Table::Fragments => Ok(()),
        }
    }
}
