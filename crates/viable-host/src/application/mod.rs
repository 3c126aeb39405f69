//! Application layer use cases for the host emulator.
//!
//! # Sub-modules
//!
//! - **`open_device`**   – Builds a ready [`viable_core::Viable`] from the
//!   host configuration: file-backed store, definition blob, host sinks, and
//!   the init step that validates (or resets) the persistent region.
//!
//! - **`serve_packets`** – The packet loop: hex lines in, hex replies out,
//!   through the core's packet router.
//!
//! - **`dump_state`**    – A JSON snapshot of every table and the settings
//!   record, for inspecting a store file without a client.

pub mod dump_state;
pub mod open_device;
pub mod serve_packets;
