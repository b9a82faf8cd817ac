//! Deduplication of concurrent loads.
//!
//! The first caller for a key becomes the leader: its load is spawned as a
//! task and the in-flight table records a `watch` receiver for it. Callers
//! arriving while the load runs join that receiver instead of loading again.
//! `watch` is level-triggered, so a follower that subscribes after the result
//! was published still observes it.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

/// Error shared between the leader and every follower of a load.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Outcome of one load, handed out to every caller that joined it.
pub type Outcome<V> = Result<V, SharedError>;

type Slot<V> = watch::Receiver<Option<Outcome<V>>>;

/// The load task ended without publishing a result.
#[derive(Debug, thiserror::Error)]
#[error("in-flight load ended without a result")]
pub struct LoadAbandoned;

/// Group de-duplicates concurrent loads keyed by `K`.
pub struct Group<K, V> {
    calls: Arc<DashMap<K, Slot<V>>>,
}

impl<K, V> Group<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty group.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(DashMap::new()),
        }
    }

    /// Runs the load produced by `f` at most once per key at a time.
    ///
    /// Returns the outcome and whether it was shared, i.e. whether this caller
    /// joined a load started by another one (`false` for the leader).
    ///
    /// The leader's load is spawned on the runtime and always runs to
    /// completion, even if every caller stops waiting for it.
    pub async fn load<F, Fut>(&self, key: K, f: F) -> (Outcome<V>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<V>> + Send + 'static,
    {
        let (rx, shared) = match self.calls.entry(key.clone()) {
            Entry::Occupied(call) => (call.get().clone(), true),
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(None);
                slot.insert(rx.clone());

                let fut = f();
                let guard = CallGuard {
                    calls: self.calls.clone(),
                    key,
                };
                tokio::spawn(async move {
                    let outcome = fut.await;
                    let _ = tx.send(Some(outcome));
                    // Cleared after publishing, so a caller arriving in between
                    // still gets this result instead of starting a second load.
                    drop(guard);
                });

                (rx, false)
            }
        };

        (wait(rx).await, shared)
    }

    /// Number of loads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.len()
    }
}

impl<K, V> Default for Group<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

async fn wait<V: Clone>(mut rx: Slot<V>) -> Outcome<V> {
    loop {
        if let Some(outcome) = rx.borrow_and_update().clone() {
            return outcome;
        }
        if rx.changed().await.is_err() {
            // Sender is gone: either the value landed right before it was
            // dropped, or the task panicked.
            return match rx.borrow().clone() {
                Some(outcome) => outcome,
                None => Err(Arc::new(LoadAbandoned)),
            };
        }
    }
}

/// Clears the in-flight record when the load task ends, including on panic.
struct CallGuard<K: Hash + Eq, V> {
    calls: Arc<DashMap<K, Slot<V>>>,
    key: K,
}

impl<K: Hash + Eq, V> Drop for CallGuard<K, V> {
    fn drop(&mut self) {
        self.calls.remove(&self.key);
    }
}
