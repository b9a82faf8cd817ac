//! Self-refreshing, load-once cache.

pub mod cache;
pub mod counters;
pub mod error;
pub mod loader;
pub mod telemetry;


// Re-export main types
pub use cache::{Cache, CacheBuilder, Stats};
pub use error::CacheError;
pub use loader::{from_fn, BoxError, FnLoader, Loader};
