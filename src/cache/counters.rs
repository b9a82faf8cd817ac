//! Lookup and load counters of a cache instance.

use std::sync::atomic::{AtomicI64, Ordering};

/// Counters for lookups and caller-triggered loads.
pub struct Counters {
    /// Lookups served from the store.
    pub hits: AtomicI64,
    /// Lookups that had to load.
    pub misses: AtomicI64,
    /// Loader invocations this cache led, from lookups or refreshes.
    pub loads: AtomicI64,
    /// Loads joined while another caller was already loading.
    pub shared_loads: AtomicI64,
    /// Failed caller-triggered loads.
    pub load_errors: AtomicI64,
}

impl Counters {
    /// Creates new counters.
    pub fn new() -> Self {
        Self {
            hits: AtomicI64::new(0),
            misses: AtomicI64::new(0),
            loads: AtomicI64::new(0),
            shared_loads: AtomicI64::new(0),
            load_errors: AtomicI64::new(0),
        }
    }

    pub fn hits(&self) -> i64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> i64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn loads(&self) -> i64 {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn shared_loads(&self) -> i64 {
        self.shared_loads.load(Ordering::Relaxed)
    }

    pub fn load_errors(&self) -> i64 {
        self.load_errors.load(Ordering::Relaxed)
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
