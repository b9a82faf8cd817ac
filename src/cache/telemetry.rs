//! Periodic stats logger for a cache instance.

use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::db::{Key, Value};
use crate::metrics;

use super::Cache;

/// Telemetry logger for a cache: logs its stats and publishes gauges.
pub async fn logger<K: Key, V: Value>(
    shutdown_token: CancellationToken,
    cache: Cache<K, V>,
    each: Duration,
) {
    let mut ticker = interval(each);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                tracing::debug!(svc = "cache", name = %cache.name(), "logger stopped");
                return;
            }
            _ = ticker.tick() => {
                let stats = cache.stats();

                metrics::set_cache_length(stats.length);
                metrics::set_refresh_chains(stats.chains);

                tracing::info!(
                    name = %cache.name(),
                    length = stats.length,
                    chains = stats.chains,
                    hits = stats.hits,
                    misses = stats.misses,
                    loads = stats.loads,
                    shared_loads = stats.shared_loads,
                    load_errors = stats.load_errors,
                    refreshes = stats.refreshes,
                    refresh_errors = stats.refresh_errors,
                    "cache stats"
                );
            }
        }
    }
}
