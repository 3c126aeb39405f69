//! Self-expiring client session ids.
//!
//! # How an id expires without a session table (for beginners)
//!
//! An id is built as `(now & 0xFFFF_0000) | counter`: the high half is the
//! allocation time in 65536 ms ticks, the low half a running counter that
//! keeps ids unique within one tick.  Validity is recomputed from the id
//! alone: take the age `now_high - id_high` (wrapping) and accept it while it
//! is below the TTL.  Nothing is stored per client, so nothing needs cleaning
//! up, but anyone who sees an id can reuse it until it expires.  There is no
//! confidentiality goal.

use std::fmt;

use tracing::debug;

/// Mask selecting the allocation-time half of an id.
pub const TIME_MASK: u32 = 0xFFFF_0000;

/// Default session lifetime.
pub const DEFAULT_TTL_SECS: u16 = 120;

/// A 32-bit client id as carried in the wrapper header (little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u32);

impl ClientId {
    /// Reserved: a bootstrap request asking for a new id.
    pub const BOOTSTRAP: ClientId = ClientId(0x0000_0000);
    /// Reserved: never valid.
    pub const ERROR: ClientId = ClientId(0xFFFF_FFFF);

    pub fn is_reserved(self) -> bool {
        self == Self::BOOTSTRAP || self == Self::ERROR
    }

    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Allocates and validates client ids.
#[derive(Debug, Clone)]
pub struct SessionAllocator {
    counter: u16,
    ttl_secs: u16,
}

impl SessionAllocator {
    /// `seed` initializes the counter; pass the clock reading at startup so
    /// ids differ across power cycles.
    pub fn new(seed: u32, ttl_secs: u16) -> Self {
        Self {
            counter: (seed & 0xFFFF) as u16,
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u16 {
        self.ttl_secs
    }

    /// A fresh id for a client bootstrapping at `now_ms`.  Never returns a
    /// reserved id.
    pub fn allocate(&mut self, now_ms: u32) -> ClientId {
        loop {
            let id = ClientId((now_ms & TIME_MASK) | u32::from(self.counter));
            self.counter = self.counter.wrapping_add(1);
            if !id.is_reserved() {
                debug!(client = %id, "allocated client id");
                return id;
            }
        }
    }

    /// Whether `id` is unreserved and younger than the TTL at `now_ms`.
    pub fn is_valid(&self, id: ClientId, now_ms: u32) -> bool {
        if id.is_reserved() {
            return false;
        }
        let age = (now_ms & TIME_MASK).wrapping_sub(id.0 & TIME_MASK);
        age < u32::from(self.ttl_secs) * 1000
    }
}

impl Default for SessionAllocator {
    fn default() -> Self {
        Self::new(0, DEFAULT_TTL_SECS)
    }
}
