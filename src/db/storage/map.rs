//! Sharded concurrent map backing the cache store.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI64, Ordering};

use xxhash_rust::xxh3::Xxh3;

use super::shard::{Key, Shard, Value};

/// Number of shards in the map.
pub const NUM_OF_SHARDS: usize = 64;
pub const SHARD_MASK: u64 = (NUM_OF_SHARDS - 1) as u64;

/// Map is a sharded concurrent map with a precise global length counter.
///
/// Entries are never removed: a key stays resident from its first `set`
/// until the map is dropped, later `set` calls only overwrite the value.
pub struct Map<K: Key, V: Value> {
    pub(crate) len: AtomicI64,
    pub(crate) shards: Vec<Shard<K, V>>,
}

impl<K: Key, V: Value> Map<K, V> {
    /// Creates a new sharded map.
    pub fn new() -> Self {
        let mut shards = Vec::with_capacity(NUM_OF_SHARDS);
        shards.resize_with(NUM_OF_SHARDS, Shard::new);

        Self {
            len: AtomicI64::new(0),
            shards,
        }
    }

    /// Sets or overwrites a value. Last writer wins.
    pub fn set(&self, key: K, value: V) {
        let len_delta = self.shard(&key).set(key, value);
        if len_delta != 0 {
            self.len.fetch_add(len_delta, Ordering::Relaxed);
        }
    }

    /// Stores the value only when the key has never been set.
    /// Returns true if the value was stored.
    pub fn set_if_absent(&self, key: K, value: V) -> bool {
        let stored = self.shard(&key).set_if_absent(key, value);
        if stored {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        stored
    }

    /// Gets a value by key.
    pub fn get(&self, key: &K) -> Option<V> {
        self.shard(key).get(key)
    }

    /// Reports whether the key has ever been set.
    pub fn contains(&self, key: &K) -> bool {
        self.shard(key).contains(key)
    }

    /// Gets the number of stored keys.
    pub fn len(&self) -> i64 {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the shard for a key.
    pub fn shard(&self, key: &K) -> &Shard<K, V> {
        &self.shards[shard_index(key)]
    }
}

impl<K: Key, V: Value> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a key to its shard index.
pub(crate) fn shard_index<K: Hash>(key: &K) -> usize {
    let mut hasher = Xxh3::new();
    key.hash(&mut hasher);
    (hasher.finish() & SHARD_MASK) as usize
}
