//! Cache storage functionality.

pub mod storage;

// Re-export main types
pub use storage::{Key, Map, Value};
