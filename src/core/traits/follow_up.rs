//! Follow-up actions for words a completed batch never answered

use async_trait::async_trait;
use tracing::warn;

use crate::core::batch::WordQueryRecord;
use crate::utils::error::Result;

/// Receives the records of words missing from a batch's output file, after
/// those records have been moved to the completed table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MissingWordHandler: Send + Sync {
    async fn handle_missing(&self, batch_id: &str, missing: &[WordQueryRecord]) -> Result<()>;
}

/// Logs the gap and leaves remediation to an operator
#[derive(Debug, Clone, Default)]
pub struct ReportOnly;

#[async_trait]
impl MissingWordHandler for ReportOnly {
    async fn handle_missing(&self, batch_id: &str, missing: &[WordQueryRecord]) -> Result<()> {
        let words: Vec<&str> = missing.iter().map(|r| r.word.as_str()).collect();
        warn!(
            "Batch {} completed without results for {} word(s): {:?}",
            batch_id,
            words.len(),
            words
        );
        Ok(())
    }
}
