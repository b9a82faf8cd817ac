// Package workers exposes backend interfaces used by worker groups.

use crate::cache::CacheError;

/// RefreshBackend interface for refresh operations.
#[async_trait::async_trait]
pub trait RefreshBackend<K>: Send + Sync {
    /// Reloads the value for a key and stores it on success.
    /// A failure must leave the previously stored value untouched.
    async fn on_refresh(&self, key: &K) -> Result<(), CacheError>;
}
