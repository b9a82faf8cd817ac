// Package refresher drives the per-key refresh-ahead timer chains.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::db::Key;
use crate::metrics;
use crate::workers::RefreshBackend;

use super::counters::Counters;

/// Refresher keeps one self-rescheduling refresh chain per loaded key.
///
/// A chain sleeps for the refresh interval, refreshes its key through the
/// backend and sleeps again, whatever the refresh outcome. It only stops when
/// the refresher is closed or the backend has been dropped.
pub struct Refresher<K: Key> {
    shutdown_token: CancellationToken,
    name: String,
    interval: Duration,
    armed: Arc<DashMap<K, ()>>,
    counters: Arc<Counters>,
}

impl<K: Key> Refresher<K> {
    /// Creates a new refresher with no armed chains.
    pub fn new(shutdown_token: CancellationToken, name: String, interval: Duration) -> Self {
        Self {
            shutdown_token,
            name,
            interval,
            armed: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::new()),
        }
    }

    /// Arms the refresh chain for a key.
    /// Returns false if a chain is already armed for it or the refresher is closed.
    pub fn arm(&self, key: K, backend: Weak<dyn RefreshBackend<K>>) -> bool {
        if self.shutdown_token.is_cancelled() {
            return false;
        }

        match self.armed.entry(key.clone()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }
        metrics::set_refresh_chains(self.armed.len());

        debug!(
            component = "refresher",
            event = "chain_armed",
            name = %self.name,
            key = ?key,
            every = %humantime::format_duration(self.interval),
            "refresh chain armed"
        );

        let chain = Chain {
            key,
            interval: self.interval,
            name: self.name.clone(),
            token: self.shutdown_token.clone(),
            backend,
            counters: self.counters.clone(),
            armed: self.armed.clone(),
        };
        tokio::spawn(chain.run());

        true
    }

    /// Gets the number of armed chains.
    pub fn armed(&self) -> usize {
        self.armed.len()
    }

    /// Checks whether a chain is armed for the key.
    pub fn is_armed(&self, key: &K) -> bool {
        self.armed.contains_key(key)
    }

    /// Gets the refresh counters.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Gets the refresh interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops every chain at its next wake-up and refuses new ones.
    /// A refresh that is already running is not interrupted.
    pub fn close(&self) {
        if self.shutdown_token.is_cancelled() {
            return;
        }
        self.shutdown_token.cancel();
        info!(
            component = "refresher",
            event = "closed",
            name = %self.name,
            chains = self.armed.len(),
            "refresher closed"
        );
    }
}

/// One key's refresh chain.
struct Chain<K: Key> {
    key: K,
    interval: Duration,
    name: String,
    token: CancellationToken,
    backend: Weak<dyn RefreshBackend<K>>,
    counters: Arc<Counters>,
    armed: Arc<DashMap<K, ()>>,
}

impl<K: Key> Chain<K> {
    async fn run(self) {
        let _guard = ChainGuard {
            armed: self.armed.clone(),
            key: self.key.clone(),
            name: self.name.clone(),
        };

        loop {
            tokio::select! {
                _ = self.token.cancelled() => {
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let Some(backend) = self.backend.upgrade() else {
                return;
            };

            self.counters.fires.fetch_add(1, Ordering::Relaxed);
            match backend.on_refresh(&self.key).await {
                Ok(()) => {
                    self.counters.success_updates.fetch_add(1, Ordering::Relaxed);
                    metrics::add_refresh_updated(1);
                }
                Err(e) => {
                    self.counters.error_updates.fetch_add(1, Ordering::Relaxed);
                    metrics::add_refresh_errors(1);
                    warn!(
                        component = "refresher",
                        event = "refresh_failed",
                        name = %self.name,
                        key = ?self.key,
                        error = %e,
                        "refresh failed, keeping stale value"
                    );
                }
            }
        }
    }
}

/// Guard to disarm the key when its chain ends.
struct ChainGuard<K: Key> {
    armed: Arc<DashMap<K, ()>>,
    key: K,
    name: String,
}

impl<K: Key> Drop for ChainGuard<K> {
    fn drop(&mut self) {
        self.armed.remove(&self.key);
        metrics::set_refresh_chains(self.armed.len());
        debug!(
            component = "refresher",
            event = "chain_stopped",
            name = %self.name,
            key = ?self.key,
            "refresh chain stopped"
        );
    }
}
