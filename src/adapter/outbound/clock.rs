//! Clock adapters.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::port::Clock;

/// Wall-clock time from the system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Pre-epoch readings clamp to zero.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock that only moves when told to.
///
/// Used by scenario replay and tests to step past resolution deadlines
/// deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start_ms`.
    #[must_use]
    pub const fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Move forward by `delta_ms`, returning the new reading.
    pub fn advance(&self, delta_ms: u64) -> u64 {
        let previous = self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
        previous.saturating_add(delta_ms)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
