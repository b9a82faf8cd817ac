//! Self-refreshing, load-once key-value cache.
//!
//! Values are loaded lazily on first access, concurrent loads of one key are
//! collapsed into a single loader call, and every loaded key is reloaded in
//! the background at a fixed interval.

pub mod cache;
pub mod config;
pub mod db;
pub mod metrics;
pub mod singleflight;
pub mod workers;

pub use cache::{Cache, CacheBuilder, CacheError, Loader, Stats};
