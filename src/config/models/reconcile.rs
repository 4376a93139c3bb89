//! Reconciliation pass configuration

use super::{default_concurrency, default_not_found_ceiling_hours, default_timeout};
use serde::{Deserialize, Serialize};

/// Pass tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Batches processed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Timeout for each batch API and queue call, in seconds
    #[serde(default = "default_timeout")]
    pub remote_timeout_secs: u64,
    /// Hours a batch may stay unknown to the batch API before its records
    /// are marked failed. 0 disables the ceiling.
    #[serde(default = "default_not_found_ceiling_hours")]
    pub not_found_ceiling_hours: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            remote_timeout_secs: default_timeout(),
            not_found_ceiling_hours: default_not_found_ceiling_hours(),
        }
    }
}
