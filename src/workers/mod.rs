// Worker functionality for cache management.

pub mod backend;
pub mod refresher;

// Re-export main types
pub use backend::RefreshBackend;
pub use refresher::Refresher;
