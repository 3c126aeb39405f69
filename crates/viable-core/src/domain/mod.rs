//! Entry types stored in the persistent region.
//!
//! Each type knows its packed little-endian byte image through
//! [`entries::TableEntry`]; the same image is used on the wire, so a protocol
//! get returns exactly the bytes held by the store.
//!
//! Every table keeps its "enabled" indicator in a single bit.  A torn write
//! that leaves that bit clear yields an inert entry rather than a malformed
//! one that the engines would act on.

pub mod entries;

pub use entries::{
    AltRepeatKeyEntry, AltRepeatOptions, ComboEntry, CustomTerm, KeyOverrideEntry,
    KeyOverrideOptions, LeaderEntry, LeaderOptions, OneShotSettings, TableEntry, TapDanceEntry,
    COMBO_INPUTS, LEADER_SEQUENCE_LEN,
};
