//! Millisecond time source.
//!
//! All timers in the core are 32-bit millisecond counters compared with
//! wrapping arithmetic, so a counter rollover does not break elapsed-time
//! checks shorter than ~24 days.

use std::cell::Cell;

/// A free-running millisecond counter.
pub trait Clock {
    fn now_ms(&self) -> u32;

    /// Milliseconds since `since`, tolerant of counter wrap.
    fn elapsed_since(&self, since: u32) -> u32 {
        self.now_ms().wrapping_sub(since)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
