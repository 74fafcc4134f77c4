//! Seed counter for per-probe random identifier sources.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static GLOBAL: OnceLock<Arc<SeedCounter>> = OnceLock::new();

/// Monotonic counter whose values seed random generators.
///
/// Values are only ever used as seeds, never as identifiers, so two probes
/// created back to back draw from different random streams.
#[derive(Debug)]
pub struct SeedCounter {
    value: AtomicU64,
}

impl SeedCounter {
    pub fn new(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }

    /// Counter starting at the current wall clock in nanoseconds.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(nanos)
    }

    /// Process-wide counter used by checkers built without an explicit one.
    pub fn global() -> Arc<SeedCounter> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::from_clock())))
    }

    /// Increments the counter and returns the new value.
    pub fn next_seed(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }
}

impl Default for SeedCounter {
    fn default() -> Self {
        Self::from_clock()
    }
}
