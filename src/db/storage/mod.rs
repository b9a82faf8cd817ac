//! Sharded in-memory store for loaded values.

pub mod map;
pub mod shard;

#[cfg(test)]
mod shard_test;

// Re-export main types
pub use map::Map;
pub use shard::{Key, Shard, Value};

// Re-export NUM_OF_SHARDS for tests
#[cfg(test)]
pub use map::NUM_OF_SHARDS;
