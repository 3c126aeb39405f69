//! Settings registry: get/set/query/reset over the QMK settings record.
//!
//! The record is cached in RAM and written back whole after every change.
//! Scalar settings are pushed to the live subsystems through a
//! [`SettingsSink`] right after they persist; single-bit settings only
//! persist, because their consumers read them from the record on demand.
//!
//! QSID 21 ("magic") is not part of the record at all.  It exposes the
//! keyboard-wide modifier swap flags owned by the sink and is handled before
//! the registry lookup.

pub mod record;
pub mod registry;
pub mod sink;

pub use record::QmkSettings;
pub use registry::{qsid, SettingDescriptor, SettingsRegistry};
pub use sink::{KeymapFlags, MemorySettingsSink, SettingsSink};

use thiserror::Error;
use tracing::debug;

use crate::config::{FeatureFlags, SettingsDefaults};
use crate::storage::{Storage, StoreError, ViableStore};

/// Errors from settings operations.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting id {0}")]
    UnknownQsid(u16),

    #[error("setting {qsid} needs {needed} bytes, buffer has {available}")]
    BufferTooShort {
        qsid: u16,
        needed: usize,
        available: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SettingsError {
    /// Status byte sent back to the client.
    pub const STATUS: u8 = 0xFF;
}

/// Owned settings state: registry, RAM copy of the record, factory values.
#[derive(Debug, Clone)]
pub struct Settings {
    registry: SettingsRegistry,
    record: QmkSettings,
    defaults: SettingsDefaults,
    features: FeatureFlags,
}

impl Settings {
    pub fn new(defaults: SettingsDefaults, features: FeatureFlags) -> Self {
        Self {
            registry: SettingsRegistry::new(features.mouse_keys),
            record: QmkSettings::factory(&defaults, features.mouse_keys),
            defaults,
            features,
        }
    }

    pub fn record(&self) -> &QmkSettings {
        &self.record
    }

    pub fn registry(&self) -> &SettingsRegistry {
        &self.registry
    }

    /// Refreshes the RAM copy from the store and applies it.
    pub fn load<S: Storage>(
        &mut self,
        store: &ViableStore<S>,
        sink: &mut dyn SettingsSink,
    ) -> Result<(), SettingsError> {
        self.record = QmkSettings::from_bytes(&store.settings_record()?);
        sink.apply(&self.record);
        Ok(())
    }

    /// See [`SettingsRegistry::query`].
    pub fn query(&self, qsid_gt: u16, out: &mut [u8]) {
        self.registry.query(qsid_gt, out);
    }

    /// Copies the value of `qsid` to the front of `out`.
    ///
    /// Bit settings read as a single `0`/`1` byte; the magic flags as a
    /// 4-byte LE word.
    pub fn get(
        &self,
        id: u16,
        out: &mut [u8],
        sink: &dyn SettingsSink,
    ) -> Result<(), SettingsError> {
        let desc = self
            .registry
            .find(id)
            .ok_or(SettingsError::UnknownQsid(id))?;
        check_len(id, desc.size as usize, out.len())?;

        if desc.is_magic() {
            out[..4].copy_from_slice(&sink.keymap_flags().to_wire().to_le_bytes());
            return Ok(());
        }

        let bytes = self.record.to_bytes();
        let offset = desc.offset as usize;
        match desc.bit {
            Some(bit) => out[0] = (bytes[offset] >> bit) & 1,
            None => {
                let size = desc.size as usize;
                out[..size].copy_from_slice(&bytes[offset..offset + size]);
            }
        }
        Ok(())
    }

    /// Writes `qsid` from the front of `data`, persists the record, and for
    /// scalar settings applies it.
    pub fn set<S: Storage>(
        &mut self,
        id: u16,
        data: &[u8],
        store: &mut ViableStore<S>,
        sink: &mut dyn SettingsSink,
    ) -> Result<(), SettingsError> {
        let desc = *self
            .registry
            .find(id)
            .ok_or(SettingsError::UnknownQsid(id))?;
        check_len(id, desc.size as usize, data.len())?;

        if desc.is_magic() {
            let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            sink.clear_keyboard();
            let flags = sink.keymap_flags().with_wire(word);
            sink.set_keymap_flags(flags);
            debug!(flags = flags.0, "keymap flags updated");
            return Ok(());
        }

        let mut bytes = self.record.to_bytes();
        let offset = desc.offset as usize;
        match desc.bit {
            Some(bit) if data[0] != 0 => bytes[offset] |= 1 << bit,
            Some(bit) => bytes[offset] &= !(1 << bit),
            None => {
                let size = desc.size as usize;
                bytes[offset..offset + size].copy_from_slice(&data[..size]);
            }
        }

        store.write_settings_record(&bytes)?;
        self.record = QmkSettings::from_bytes(&bytes);
        debug!(qsid = id, "setting updated");

        if desc.applies {
            sink.apply(&self.record);
        }
        Ok(())
    }

    /// Restores factory values, persists and applies them, and resets the
    /// keymap flags.
    pub fn reset<S: Storage>(
        &mut self,
        store: &mut ViableStore<S>,
        sink: &mut dyn SettingsSink,
    ) -> Result<(), SettingsError> {
        self.record = QmkSettings::factory(&self.defaults, self.features.mouse_keys);
        store.write_settings_record(&self.record.to_bytes())?;
        sink.apply(&self.record);

        sink.clear_keyboard();
        sink.set_keymap_flags(KeymapFlags::factory(self.features.nkro));
        debug!("settings reset to defaults");
        Ok(())
    }
}

fn check_len(qsid: u16, needed: usize, available: usize) -> Result<(), SettingsError> {
    if available < needed {
        return Err(SettingsError::BufferTooShort {
            qsid,
            needed,
            available,
        });
    }
    Ok(())
}
