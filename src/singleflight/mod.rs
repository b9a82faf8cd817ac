//! Singleflight-style de-duplication of concurrent loads.

pub mod group;

#[cfg(test)]
mod group_test;

pub use group::{Group, LoadAbandoned, Outcome, SharedError};
