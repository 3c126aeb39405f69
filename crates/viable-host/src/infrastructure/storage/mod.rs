//! Storage infrastructure: configuration file and persistent region.
//!
//! - `config` reads the TOML configuration, falling back to defaults when the
//!   file does not exist yet (first run).
//! - `file_store` backs the core's byte-addressable [`viable_core::Storage`]
//!   with a file, so configuration written by a client survives a restart the
//!   way it survives a power cycle on a keyboard.

pub mod config;
pub mod file_store;
