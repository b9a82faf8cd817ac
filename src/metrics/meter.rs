// Metric name constants
pub const HITS: &str = "cache_hits";
pub const MISSES: &str = "cache_misses";
pub const LOADS: &str = "cache_loads";
pub const SHARED_LOADS: &str = "cache_shared_loads";
pub const LOAD_ERRORS: &str = "cache_load_errors";
pub const MAP_LENGTH: &str = "cache_length";

pub const REFRESHER_UPDATED: &str = "refresh_updated";
pub const REFRESHER_ERRORS: &str = "refresh_errors";
pub const REFRESHER_CHAINS: &str = "refresh_chains";

/// Adds cache hits.
pub fn add_hits(value: u64) {
    metrics::counter!(HITS).increment(value);
}

/// Adds cache misses.
pub fn add_misses(value: u64) {
    metrics::counter!(MISSES).increment(value);
}

/// Adds loads led by this process.
pub fn add_loads(value: u64) {
    metrics::counter!(LOADS).increment(value);
}

/// Adds loads joined while in flight.
pub fn add_shared_loads(value: u64) {
    metrics::counter!(SHARED_LOADS).increment(value);
}

/// Adds failed caller-triggered loads.
pub fn add_load_errors(value: u64) {
    metrics::counter!(LOAD_ERRORS).increment(value);
}

/// Sets the number of stored keys.
pub fn set_cache_length(length: i64) {
    metrics::gauge!(MAP_LENGTH).set(length as f64);
}

/// Adds successful refreshes.
pub fn add_refresh_updated(value: u64) {
    metrics::counter!(REFRESHER_UPDATED).increment(value);
}

/// Adds failed refreshes.
pub fn add_refresh_errors(value: u64) {
    metrics::counter!(REFRESHER_ERRORS).increment(value);
}

/// Sets the number of armed refresh chains.
pub fn set_refresh_chains(chains: usize) {
    metrics::gauge!(REFRESHER_CHAINS).set(chains as f64);
}
