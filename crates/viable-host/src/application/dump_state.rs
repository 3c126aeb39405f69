//! JSON snapshot of a device's persistent state.

use serde::Serialize;
use viable_core::{
    AltRepeatKeyEntry, ComboEntry, KeyOverrideEntry, LeaderEntry, OneShotSettings, QmkSettings,
    Storage, StoreError, TapDanceEntry, Viable,
};

/// Everything a client could read back, in one document.
#[derive(Debug, Serialize)]
pub struct StateSnapshot {
    pub keyboard_uid: String,
    pub magic: String,
    pub tap_dance: Vec<TapDanceEntry>,
    pub combo: Vec<ComboEntry>,
    pub key_override: Vec<KeyOverrideEntry>,
    pub alt_repeat_key: Vec<AltRepeatKeyEntry>,
    pub leader: Vec<LeaderEntry>,
    pub one_shot: OneShotSettings,
    pub settings: QmkSettings,
    pub fragment_selections: Vec<u8>,
}

impl StateSnapshot {
    /// Reads every table from the device's store.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the medium fails.
    pub fn capture<S: Storage>(viable: &Viable<S>) -> Result<Self, StoreError> {
        let store = viable.store();
        let fragments = viable.fragment_selections()?;
        Ok(Self {
            keyboard_uid: hex::encode(viable.config().keyboard_uid),
            magic: hex::encode(store.magic()?),
            tap_dance: store.entries()?,
            combo: store.entries()?,
            key_override: store.entries()?,
            alt_repeat_key: store.entries()?,
            leader: store.entries()?,
            one_shot: store.one_shot()?,
            settings: *viable.settings().record(),
            fragment_selections: fragments.ids[..usize::from(fragments.count)].to_vec(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viable_core::{Layout, MemoryStorage, Table, ViableConfig};

    #[test]
    fn test_snapshot_reflects_written_entries() {
        // Arrange
        let config = ViableConfig {
            keyboard_uid: [0xAB; 8],
            fragment_instances: 2,
            ..ViableConfig::default()
        };
        let size = Layout::new(config.capacities).total_size();
        let mut viable = Viable::new(MemoryStorage::new(size), config).unwrap();
        viable.init().unwrap();
        viable
            .write_entry(Table::AltRepeatKey, 1, &[0x2B, 0, 0x29, 0, 0, 0x08])
            .unwrap();

        // Act
        let snapshot = StateSnapshot::capture(&viable).unwrap();

        // Assert
        assert_eq!(snapshot.keyboard_uid, "abababababababab");
        assert_eq!(snapshot.tap_dance.len(), 16);
        assert_eq!(snapshot.alt_repeat_key[1].alt_keycode.0, 0x29);
        assert_eq!(snapshot.one_shot.timeout, 5000);
        assert_eq!(snapshot.fragment_selections.len(), 2);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        // Arrange
        let config = ViableConfig::default();
        let size = Layout::new(config.capacities).total_size();
        let mut viable = Viable::new(MemoryStorage::new(size), config).unwrap();
        viable.init().unwrap();

        // Act
        let json = StateSnapshot::capture(&viable).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        // Assert
        assert_eq!(value["settings"]["tapping_term"], 200);
        assert_eq!(value["combo"].as_array().map(Vec::len), Some(16));
    }
}
