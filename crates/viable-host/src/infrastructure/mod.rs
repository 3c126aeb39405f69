//! Infrastructure layer for the host emulator.
//!
//! Contains the OS-facing adapters the core treats as interfaces: the
//! file-backed storage medium, the wall clock, the key-action and settings
//! sinks that log what firmware would have done, and the legacy protocol
//! handler.
//!
//! **Dependency rule**: this layer may depend on `viable_core`, but MUST NOT
//! be imported by `viable_core`.

pub mod clock;
pub mod legacy;
pub mod sinks;
pub mod storage;
