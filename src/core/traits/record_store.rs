//! Record store trait
//!
//! Two logical tables: active word queries keyed by record id, and their
//! completed counterparts.

use async_trait::async_trait;

use crate::core::batch::{ActiveScan, CompletedWordQueryRecord, QueryStatus, WordQueryRecord};
use crate::utils::error::Result;

/// Storage for active and completed word queries
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record in the active table. Rows that cannot be decoded are
    /// listed in [`ActiveScan::undecodable`] rather than failing the scan.
    async fn scan_active(&self) -> Result<ActiveScan>;

    /// Active records with the given status
    async fn query_active_by_status(&self, status: QueryStatus) -> Result<Vec<WordQueryRecord>>;

    /// Insert or replace an active record
    async fn put_active(&self, record: &WordQueryRecord) -> Result<()>;

    /// Update an existing active record in place
    async fn update_active(&self, record: &WordQueryRecord) -> Result<()>;

    /// Delete an active record. Deleting a missing record is not an error.
    async fn delete_active(&self, id: &str) -> Result<()>;

    /// Insert or replace a completed record
    async fn put_completed(&self, record: &CompletedWordQueryRecord) -> Result<()>;

    /// Completed record by id, or `None` if it was never moved
    async fn get_completed(&self, id: &str) -> Result<Option<CompletedWordQueryRecord>>;

    /// Every record in the completed table
    async fn scan_completed(&self) -> Result<Vec<CompletedWordQueryRecord>>;
}
