//! Metrics emitted through the `metrics` facade.
//
//! No recorder is installed here: without one every call is a no-op, an
//! embedding process installs its own exporter.

pub mod meter;

// Re-export commonly used items
pub use meter::*;
