//! Configuration data models
//!
//! This module defines all configuration structures used by the reconciler.

pub mod logging;
pub mod openai;
pub mod queue;
pub mod reconcile;
pub mod storage;

// Re-export all configuration types
pub use logging::*;
pub use openai::*;
pub use queue::*;
pub use reconcile::*;
pub use storage::*;

/// Default OpenAI API base
pub fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default remote request timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default database max connections
pub fn default_max_connections() -> u32 {
    5
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Default queue name
pub fn default_queue_name() -> String {
    "word-updates".to_string()
}

/// Default number of batches processed concurrently
pub fn default_concurrency() -> usize {
    4
}

/// Default staleness ceiling for batches the API cannot find, in hours
pub fn default_not_found_ceiling_hours() -> u64 {
    72
}

/// Default log filter
pub fn default_log_filter() -> String {
    "info".to_string()
}
