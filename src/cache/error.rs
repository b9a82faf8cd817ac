//! Cache errors.

use std::time::Duration;

use crate::singleflight::SharedError;

/// Errors produced by the cache.
///
/// Sources are shared so that one loader failure can be handed to every
/// caller that joined the same load.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The loader failed on a caller-triggered load. Nothing was cached.
    #[error("failed to fetch value for key {key}: {source}")]
    LoadFailed {
        key: String,
        #[source]
        source: SharedError,
    },

    /// The loader failed on a background refresh. The stale value was kept.
    #[error("failed to refresh value for key {key}: {source}")]
    RefreshFailed {
        key: String,
        #[source]
        source: SharedError,
    },

    /// The refresh interval must be positive.
    #[error("refresh interval must be positive, got {0:?}")]
    InvalidInterval(Duration),

    /// The builder was finished without a loader.
    #[error("cache loader is not set")]
    MissingLoader,
}

impl CacheError {
    /// Gets the underlying loader failure, if any.
    pub fn cause(&self) -> Option<&SharedError> {
        match self {
            CacheError::LoadFailed { source, .. } | CacheError::RefreshFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
