// Package refresher provides counters for refresh chains.

use std::sync::atomic::{AtomicI64, Ordering};

/// Counters for refresh operations.
pub struct Counters {
    /// Timer fires.
    pub fires: AtomicI64,
    /// Successful refresh operations.
    pub success_updates: AtomicI64,
    /// Failed refresh operations.
    pub error_updates: AtomicI64,
}

impl Counters {
    /// Creates new counters.
    pub fn new() -> Self {
        Self {
            fires: AtomicI64::new(0),
            success_updates: AtomicI64::new(0),
            error_updates: AtomicI64::new(0),
        }
    }

    /// Returns (fires, updated, errors) without resetting.
    pub fn snapshot(&self) -> (i64, i64, i64) {
        (
            self.fires.load(Ordering::Relaxed),
            self.success_updates.load(Ordering::Relaxed),
            self.error_updates.load(Ordering::Relaxed),
        )
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
