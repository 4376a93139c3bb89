//! Batch job client trait

use async_trait::async_trait;

use crate::core::batch::{OutputFile, RemoteBatch};
use crate::utils::error::Result;

/// Read access to remote batch jobs and their output files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchJobClient: Send + Sync {
    /// Current state of a batch job; `None` when the job does not exist
    async fn retrieve(&self, batch_id: &str) -> Result<Option<RemoteBatch>>;

    /// Raw content of an output file. A non-success status is returned, not
    /// raised, so the caller can classify it.
    async fn fetch_output_file(&self, file_id: &str) -> Result<OutputFile>;
}
