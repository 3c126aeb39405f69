//! # viable-core
//!
//! Configuration protocol engine for programmable keyboards.  A client on the
//! other end of a small packet channel reads and rewrites the keyboard's
//! input-remapping behavior; this crate persists those changes and feeds them
//! to the runtime engines that act on key events.
//!
//! It has no dependencies on an OS, a filesystem, or an async runtime.  The
//! storage medium, the clock, key registration, and the legacy protocol are
//! traits the embedding application implements.
//!
//! # Architecture overview (for beginners)
//!
//! A packet travels leaf-ward through these modules:
//!
//! - **`protocol`** – The [`PacketRouter`] looks at the first byte.  Wrapped
//!   packets (`0xDD`) carry a short-lived client id checked by the
//!   [`ClientWrapper`]; Viable commands (`0xDF`) go to [`dispatch`], which
//!   writes its reply into the same buffer.
//!
//! - **`device`** – [`Viable`] owns all state.  Every write to a table
//!   reloads that table's engine before returning.
//!
//! - **`settings`** – The QMK settings record, exposed one field at a time by
//!   numeric id (QSID) through a static registry.
//!
//! - **`engine`** – Tap dance, combos, key overrides, alternate repeat, and
//!   leader sequences: RAM caches of the stored tables plus the matching logic
//!   the key processing layer asks "what should fire?".
//!
//! - **`storage`** – The persistent byte region: a fixed sequence of tables
//!   whose offsets derive from one declarative list, guarded by a build stamp.

pub mod actions;
pub mod clock;
pub mod config;
pub mod definition;
pub mod device;
pub mod domain;
pub mod engine;
pub mod fragments;
pub mod keycode;
pub mod protocol;
pub mod settings;
pub mod storage;

// Re-export the most-used types at the crate root so callers can write
// `viable_core::Viable` instead of `viable_core::device::Viable`.
pub use actions::{KeyAction, KeyActions};
pub use clock::{Clock, ManualClock};
pub use config::{FeatureFlags, SettingsDefaults, ViableConfig, ViableConfigError};
pub use definition::KeyboardDefinition;
pub use device::{DeviceError, Viable};
pub use domain::{
    AltRepeatKeyEntry, ComboEntry, KeyOverrideEntry, LeaderEntry, OneShotSettings, TableEntry,
    TapDanceEntry,
};
pub use engine::{BehaviorOverrides, Engines, NoOverrides};
pub use fragments::{FragmentDetector, NoFragments};
pub use keycode::{Keycode, ModMask};
pub use protocol::{
    dispatch, ClientId, ClientWrapper, DispatchError, LegacyProtocol, NoLegacy, PacketRouter,
    WrapperError,
};
pub use settings::{KeymapFlags, MemorySettingsSink, QmkSettings, SettingsSink};
pub use storage::{BuildStamp, Capacities, Layout, MemoryStorage, Storage, StoreError, Table};
