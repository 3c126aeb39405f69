//! Persistent storage: the byte-addressable medium, the region layout, and
//! the typed store built on top of them.
//!
//! # How the pieces fit (for beginners)
//!
//! - [`Storage`] is the raw medium (EEPROM emulation on a keyboard, a file on
//!   the host, a `Vec<u8>` in tests).  It only knows offsets and bytes, and it
//!   makes no promise that a multi-byte write survives a power loss intact.
//! - [`layout::Layout`] says where each table starts.
//! - [`store::ViableStore`] combines the two: "read combo #3" becomes "read 12
//!   bytes at offset 236".

pub mod layout;
pub mod magic;
pub mod store;

pub use layout::{Capacities, Layout, Table};
pub use magic::{BuildStamp, MagicError};
pub use store::ViableStore;

use thiserror::Error;

/// Errors raised by the persistent store.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// A table index at or past the table's capacity.
    #[error("{table} index {index} out of range (capacity {capacity})")]
    IndexOutOfRange {
        table: Table,
        index: usize,
        capacity: usize,
    },

    /// An access that would run past the end of the medium.
    #[error("access at offset {offset} of {len} bytes exceeds medium size {size}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// The medium is smaller than the configured layout requires.
    #[error("storage medium too small: layout needs {needed} bytes, medium has {available}")]
    RegionTooSmall { needed: usize, available: usize },

    /// The underlying medium reported a failure.
    #[error("storage medium error: {0}")]
    Medium(String),
}

/// A byte-addressable persistent medium.
///
/// Reads and writes are synchronous.  A write is not atomic: if power fails
/// mid-write, any prefix of `data` may have reached the medium.
pub trait Storage {
    /// Total size of the medium in bytes.
    fn len(&self) -> usize;

    /// Returns `true` if the medium has no capacity.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fills `buf` with the bytes starting at `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Writes `data` starting at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError>;
}

/// `Ok` when `offset..offset + len` fits inside a medium of `size` bytes.
///
/// # Errors
///
/// [`StoreError::OutOfBounds`] otherwise, including on overflow.
pub fn check_bounds(offset: usize, len: usize, size: usize) -> Result<(), StoreError> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(StoreError::OutOfBounds { offset, len, size }),
    }
}

/// RAM-backed [`Storage`], used in tests and benchmarks.
///
/// Counts writes so tests can assert that a rejected request left the medium
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    bytes: Vec<u8>,
    writes: usize,
}

impl MemoryStorage {
    /// A zero-filled medium of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            writes: 0,
        }
    }

    /// Wraps existing contents.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes, writes: 0 }
    }

    /// Number of successful `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Storage for MemoryStorage {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        check_bounds(offset, buf.len(), self.bytes.len())?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        check_bounds(offset, data.len(), self.bytes.len())?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}
