//! Shard implementation.

use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicI64, Ordering};

/// Key trait for items stored in the sharded map.
/// The typed key is used as is, it is never canonicalized to a string.
pub trait Key: Hash + Eq + Clone + Debug + Send + Sync + 'static {}

impl<T> Key for T where T: Hash + Eq + Clone + Debug + Send + Sync + 'static {}

/// Value trait for items stored in the sharded map.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T> Value for T where T: Clone + Send + Sync + 'static {}

/// Shard is an independent segment of the sharded map.
pub struct Shard<K: Key, V: Value> {
    pub(crate) items: RwLock<HashMap<K, V>>,
    len: AtomicI64,
}

impl<K: Key, V: Value> Default for Shard<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> Shard<K, V> {
    /// Creates a new shard.
    pub fn new() -> Self {
        const INITIAL_CAPACITY: usize = 16;
        Self {
            items: RwLock::new(HashMap::with_capacity(INITIAL_CAPACITY)),
            len: AtomicI64::new(0),
        }
    }

    /// Gets the number of items.
    pub fn len(&self) -> i64 {
        self.len.load(Ordering::Relaxed)
    }

    /// Sets or overwrites a key-value pair.
    /// Returns the length delta (1 for a new key, 0 for an overwrite).
    pub fn set(&self, key: K, value: V) -> i64 {
        let mut items = self.items.write();
        if items.insert(key, value).is_some() {
            0
        } else {
            self.len.fetch_add(1, Ordering::Relaxed);
            1
        }
    }

    /// Inserts the pair only when the key is absent.
    /// Returns true if the value was stored.
    pub fn set_if_absent(&self, key: K, value: V) -> bool {
        let mut items = self.items.write();
        match items.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                self.len.fetch_add(1, Ordering::Relaxed);
                true
            }
        }
    }

    /// Gets a value by key.
    pub fn get(&self, key: &K) -> Option<V> {
        self.items.read().get(key).cloned()
    }

    /// Reports whether the key is present without cloning its value.
    pub fn contains(&self, key: &K) -> bool {
        self.items.read().contains_key(key)
    }
}
