//! The Viable device: one owned object holding the store, the settings, the
//! engines, and the collaborators they talk to.
//!
//! # Two paths into one state (for beginners)
//!
//! Two kinds of work touch this state, interleaved on a single thread:
//!
//! - **Protocol writes** arrive from a configuration client and change the
//!   persistent store.
//! - **Key events** come from the user typing and read the engines' RAM
//!   caches.
//!
//! Every write method here reloads exactly the engine whose table changed
//! before returning, so the next key event never sees a stale cache.  Nothing
//! is global: construct one [`Viable`] at startup and pass it by reference.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ViableConfig, ViableConfigError};
use crate::definition::KeyboardDefinition;
use crate::domain::OneShotSettings;
use crate::engine::{resolve_term, BehaviorOverrides, Engines, NoOverrides, TapHold};
use crate::fragments::{self, FragmentDetector, FragmentError, FragmentReport, NoFragments};
use crate::keycode::Keycode;
use crate::settings::{KeymapFlags, MemorySettingsSink, Settings, SettingsError, SettingsSink};
use crate::storage::{BuildStamp, Layout, Storage, StoreError, Table, ViableStore};

/// Errors from building or initializing a [`Viable`].
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ViableConfigError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

pub struct Viable<S> {
    store: ViableStore<S>,
    settings: Settings,
    engines: Engines,
    config: ViableConfig,
    stamp: BuildStamp,
    definition: KeyboardDefinition,
    detector: Box<dyn FragmentDetector>,
    overrides: Box<dyn BehaviorOverrides>,
    sink: Box<dyn SettingsSink>,
}

impl<S: Storage> Viable<S> {
    /// Builds a device over `storage` with no definition, no fragment
    /// detection, no behavior overrides, and an in-memory settings sink.
    ///
    /// Call [`Viable::init`] before serving packets.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Config`] for an invalid configuration,
    /// [`DeviceError::Store`] if `storage` is smaller than the layout.
    pub fn new(storage: S, config: ViableConfig) -> Result<Self, DeviceError> {
        let stamp = config.validate()?;
        let store = ViableStore::new(storage, Layout::new(config.capacities))?;
        let settings = Settings::new(config.defaults, config.features);
        Ok(Self {
            store,
            settings,
            engines: Engines::new(),
            stamp,
            definition: KeyboardDefinition::default(),
            detector: Box::new(NoFragments),
            overrides: Box::new(NoOverrides),
            sink: Box::new(MemorySettingsSink::new(KeymapFlags::factory(
                config.features.nkro,
            ))),
            config,
        })
    }

    pub fn with_definition(mut self, definition: KeyboardDefinition) -> Self {
        self.definition = definition;
        self
    }

    pub fn with_detector(mut self, detector: impl FragmentDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_overrides(mut self, overrides: impl BehaviorOverrides + 'static) -> Self {
        self.overrides = Box::new(overrides);
        self
    }

    pub fn with_sink(mut self, sink: impl SettingsSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Validates the persistent region and loads every cache.
    ///
    /// A missing or foreign build stamp means the region was written by a
    /// different build: it is zeroed, refilled with defaults, and stamped.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        if !self.store.is_stamped(&self.stamp)? {
            warn!(
                stored = ?self.store.magic()?,
                expected = %self.stamp,
                "persistent region stamp mismatch, resetting to defaults"
            );
            self.store.clear_all()?;
            self.write_one_shot_defaults()?;
            self.settings.reset(&mut self.store, self.sink.as_mut())?;
            self.store.stamp(&self.stamp)?;
        }

        self.settings.load(&self.store, self.sink.as_mut())?;
        self.engines.reload_all(&self.store, self.settings.record())?;
        info!(
            bytes = self.store.layout().total_size(),
            stamp = %self.stamp,
            "viable initialized"
        );
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn config(&self) -> &ViableConfig {
        &self.config
    }

    pub fn store(&self) -> &ViableStore<S> {
        &self.store
    }

    pub fn into_store(self) -> ViableStore<S> {
        self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    /// Mutable engines for key processing (dance state, leader sessions).
    pub fn engines_mut(&mut self) -> &mut Engines {
        &mut self.engines
    }

    pub fn sink(&self) -> &dyn SettingsSink {
        self.sink.as_ref()
    }

    pub fn definition(&self) -> &KeyboardDefinition {
        &self.definition
    }

    // ── Entry tables ─────────────────────────────────────────────────────────

    /// Reads record `index` of `table` into the front of `out`.
    pub fn read_entry(&self, table: Table, index: usize, out: &mut [u8]) -> Result<(), StoreError> {
        self.store.read_entry_bytes(table, index, out)
    }

    /// Writes record `index` of `table` and reloads its engine.
    ///
    /// Nothing is written or reloaded when `index` is past capacity.
    pub fn write_entry(&mut self, table: Table, index: usize, data: &[u8]) -> Result<(), StoreError> {
        self.store.write_entry_bytes(table, index, data)?;
        self.engines
            .reload(table, &self.store, self.settings.record())?;
        debug!(%table, index, "entry written");
        Ok(())
    }

    pub fn one_shot(&self) -> Result<OneShotSettings, StoreError> {
        self.store.one_shot()
    }

    pub fn set_one_shot(&mut self, settings: &OneShotSettings) -> Result<(), StoreError> {
        self.store.set_one_shot(settings)
    }

    fn write_one_shot_defaults(&mut self) -> Result<(), StoreError> {
        let defaults = &self.config.defaults;
        self.store.set_one_shot(&OneShotSettings {
            timeout: defaults.oneshot_timeout,
            tap_toggle: defaults.oneshot_tap_toggle,
        })
    }

    /// Writes are immediate, so there is nothing to flush.
    pub fn save(&mut self) {
        debug!("save requested, nothing pending");
    }

    /// Zeroes every entry table and the one-shot record, then reloads the
    /// engines.  Settings, fragment selections and the stamp are kept.
    /// One-shot defaults are only written by `init` on a stamp mismatch.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.clear_tables()?;
        self.engines.reload_all(&self.store, self.settings.record())?;
        info!("entry tables reset");
        Ok(())
    }

    // ── Settings ─────────────────────────────────────────────────────────────

    pub fn query_settings(&self, qsid_gt: u16, out: &mut [u8]) {
        self.settings.query(qsid_gt, out);
    }

    pub fn get_setting(&self, qsid: u16, out: &mut [u8]) -> Result<(), SettingsError> {
        self.settings.get(qsid, out, self.sink.as_ref())
    }

    /// Sets one setting.  Leader timing lives in the record, so the leader
    /// engine picks up the new values right away.
    pub fn set_setting(&mut self, qsid: u16, data: &[u8]) -> Result<(), SettingsError> {
        self.settings
            .set(qsid, data, &mut self.store, self.sink.as_mut())?;
        self.engines.leader.apply_settings(self.settings.record());
        Ok(())
    }

    pub fn reset_settings(&mut self) -> Result<(), SettingsError> {
        self.settings.reset(&mut self.store, self.sink.as_mut())?;
        self.engines.leader.apply_settings(self.settings.record());
        Ok(())
    }

    // ── Fragments ────────────────────────────────────────────────────────────

    pub fn detected_fragments(&self) -> FragmentReport {
        fragments::detected(self.config.fragment_instances, self.detector.as_ref())
    }

    pub fn fragment_selections(&self) -> Result<FragmentReport, StoreError> {
        fragments::selections(self.config.fragment_instances, &self.store)
    }

    pub fn set_fragment_selections(&mut self, payload: &[u8]) -> Result<(), FragmentError> {
        fragments::set_selections(payload, &mut self.store)
    }

    // ── Tap-hold timing ──────────────────────────────────────────────────────

    /// Tapping term for `keycode`: override, then the tap dance's custom term
    /// for tap-dance keycodes, then the global setting.
    pub fn tapping_term(&self, keycode: Keycode) -> u16 {
        let custom = keycode
            .tap_dance_index()
            .and_then(|i| self.engines.tap_dance.custom_term(usize::from(i)));
        resolve_term(
            self.overrides.tapping_term(keycode),
            custom,
            self.settings.record().tapping_term,
        )
    }

    /// Combo window for slot `index`.
    pub fn combo_term(&self, index: usize) -> u16 {
        self.engines.combo.term(
            index,
            self.overrides.as_ref(),
            self.settings.record().combo_term,
        )
    }

    /// The remaining tap-hold behaviors.
    pub fn tap_hold(&self) -> TapHold<'_> {
        TapHold {
            settings: self.settings.record(),
            overrides: self.overrides.as_ref(),
        }
    }
}

impl<S> std::fmt::Debug for Viable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viable")
            .field("stamp", &self.stamp)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
