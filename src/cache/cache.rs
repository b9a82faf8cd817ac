//! Refresh-ahead cache engine.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{Config, ConfigTrait, DEFAULT_NAME, DEFAULT_REFRESH_INTERVAL};
use crate::db::{Key, Map, Value};
use crate::metrics;
use crate::singleflight::{Group, Outcome, SharedError};
use crate::workers::{RefreshBackend, Refresher};

use super::counters::Counters;
use super::error::CacheError;
use super::loader::Loader;

/// Point-in-time view of a cache's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: i64,
    pub misses: i64,
    pub loads: i64,
    pub shared_loads: i64,
    pub load_errors: i64,
    pub refreshes: i64,
    pub refresh_errors: i64,
    pub length: i64,
    pub chains: usize,
}

/// Self-refreshing, load-once cache.
///
/// The first `get` for a key loads it through the loader, concurrent callers
/// share that one load. Once stored, a key is served from memory and reloaded
/// every refresh interval in the background, forever. A failed refresh keeps
/// the previous value. Keys are never evicted.
///
/// Cloning is cheap and yields a handle to the same cache.
pub struct Cache<K: Key, V: Value> {
    inner: Arc<Inner<K, V>>,
}

impl<K: Key, V: Value> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<K: Key, V: Value> {
    name: String,
    storage: Map<K, V>,
    group: Group<K, V>,
    loader: Arc<dyn Loader<K, V>>,
    refresher: Refresher<K>,
    counters: Counters,
}

impl<K: Key, V: Value> Cache<K, V> {
    /// Creates a cache refreshing every key each `refresh_interval`.
    pub fn new<L>(loader: L, refresh_interval: Duration) -> Result<Self, CacheError>
    where
        L: Loader<K, V> + 'static,
    {
        Self::builder()
            .loader(loader)
            .refresh_interval(refresh_interval)
            .build()
    }

    /// Creates a cache named and timed from configuration.
    pub fn from_config<L>(loader: L, cfg: &Config) -> Result<Self, CacheError>
    where
        L: Loader<K, V> + 'static,
    {
        Self::builder()
            .name(cfg.name())
            .refresh_interval(cfg.refresh_interval())
            .loader(loader)
            .build()
    }

    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    /// Gets the value for a key, loading it on first access.
    ///
    /// A stored value is returned without touching the loader. On a miss the
    /// load is shared with every concurrent caller for the same key; a failed
    /// load is not cached, so the next call tries again.
    pub async fn get(&self, key: &K) -> Result<V, CacheError> {
        if let Some(value) = self.inner.storage.get(key) {
            self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
            metrics::add_hits(1);
            return Ok(value);
        }

        self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
        metrics::add_misses(1);

        let value = match self.inner.load(key).await {
            Ok(value) => value,
            Err(source) => {
                self.inner.counters.load_errors.fetch_add(1, Ordering::Relaxed);
                metrics::add_load_errors(1);
                return Err(CacheError::LoadFailed {
                    key: format!("{:?}", key),
                    source,
                });
            }
        };

        // A follower resuming after a refresh must not put its older value back.
        self.inner.storage.set_if_absent(key.clone(), value.clone());

        let weak = Arc::downgrade(&self.inner);
        let backend: Weak<dyn RefreshBackend<K>> = weak;
        self.inner.refresher.arm(key.clone(), backend);

        Ok(value)
    }

    /// Checks whether a value is stored for the key, without loading it.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.storage.contains(key)
    }

    /// Gets the number of stored keys.
    pub fn len(&self) -> i64 {
        self.inner.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.storage.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresher.interval()
    }

    /// Checks whether a refresh chain is armed for the key.
    pub fn is_refreshing(&self, key: &K) -> bool {
        self.inner.refresher.is_armed(key)
    }

    /// Gets a snapshot of the cache counters.
    pub fn stats(&self) -> Stats {
        let counters = &self.inner.counters;
        let (_, refreshes, refresh_errors) = self.inner.refresher.counters().snapshot();
        Stats {
            hits: counters.hits(),
            misses: counters.misses(),
            loads: counters.loads(),
            shared_loads: counters.shared_loads(),
            load_errors: counters.load_errors(),
            refreshes,
            refresh_errors,
            length: self.inner.storage.len(),
            chains: self.inner.refresher.armed(),
        }
    }

    /// Stops every refresh chain of this cache.
    ///
    /// Stored values stay readable and misses still load, but no key is
    /// refreshed anymore.
    pub fn close(&self) {
        self.inner.refresher.close();
    }
}

impl<K: Key, V: Value> Inner<K, V> {
    /// Loads a key through the deduplicating group.
    async fn load(&self, key: &K) -> Outcome<V> {
        let loader = self.loader.clone();
        let owned = key.clone();
        let (outcome, shared) = self
            .group
            .load(key.clone(), move || async move {
                loader.load(&owned).await.map_err(SharedError::from)
            })
            .await;

        if shared {
            self.counters.shared_loads.fetch_add(1, Ordering::Relaxed);
            metrics::add_shared_loads(1);
        } else {
            self.counters.loads.fetch_add(1, Ordering::Relaxed);
            metrics::add_loads(1);
        }

        debug!(
            component = "cache",
            event = "loaded",
            name = %self.name,
            key = ?key,
            shared,
            ok = outcome.is_ok(),
            "loaded key"
        );

        outcome
    }
}

#[async_trait::async_trait]
impl<K: Key, V: Value> RefreshBackend<K> for Inner<K, V> {
    async fn on_refresh(&self, key: &K) -> Result<(), CacheError> {
        let value = self
            .load(key)
            .await
            .map_err(|source| CacheError::RefreshFailed {
                key: format!("{:?}", key),
                source,
            })?;
        self.storage.set(key.clone(), value);
        Ok(())
    }
}

impl<K: Key, V: Value> Drop for Inner<K, V> {
    fn drop(&mut self) {
        self.refresher.close();
    }
}

/// Builder for [`Cache`].
pub struct CacheBuilder<K: Key, V: Value> {
    name: String,
    refresh_interval: Duration,
    loader: Option<Arc<dyn Loader<K, V>>>,
}

impl<K: Key, V: Value> CacheBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            loader: None,
        }
    }

    /// Sets the name used in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the interval at which every loaded key is refreshed.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn loader<L>(self, loader: L) -> Self
    where
        L: Loader<K, V> + 'static,
    {
        self.shared_loader(Arc::new(loader))
    }

    /// Sets a loader that is shared with other caches.
    pub fn shared_loader(mut self, loader: Arc<dyn Loader<K, V>>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn build(self) -> Result<Cache<K, V>, CacheError> {
        if self.refresh_interval.is_zero() {
            return Err(CacheError::InvalidInterval(self.refresh_interval));
        }
        let loader = self.loader.ok_or(CacheError::MissingLoader)?;

        info!(
            component = "cache",
            event = "created",
            name = %self.name,
            refresh_interval = %humantime::format_duration(self.refresh_interval),
            "cache created"
        );

        let refresher = Refresher::new(
            CancellationToken::new(),
            self.name.clone(),
            self.refresh_interval,
        );

        Ok(Cache {
            inner: Arc::new(Inner {
                name: self.name,
                storage: Map::new(),
                group: Group::new(),
                loader,
                refresher,
                counters: Counters::new(),
            }),
        })
    }
}

impl<K: Key, V: Value> Default for CacheBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
