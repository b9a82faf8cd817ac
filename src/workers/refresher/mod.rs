//! Refresh-ahead worker: per-key timer chains.

pub mod counters;
pub mod refresher;

#[cfg(test)]
mod refresher_test;

// Re-export main types
pub use refresher::Refresher;
