//! In-memory record store
//!
//! Backs tests and local runs. Both tables are plain maps keyed by record id.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::batch::{ActiveScan, CompletedWordQueryRecord, QueryStatus, WordQueryRecord};
use crate::core::traits::RecordStore;
use crate::utils::error::{ReconcileError, Result};

/// Record store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    active: RwLock<HashMap<String, WordQueryRecord>>,
    completed: RwLock<HashMap<String, CompletedWordQueryRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with active records
    pub fn with_active(records: impl IntoIterator<Item = WordQueryRecord>) -> Self {
        let active = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            active: RwLock::new(active),
            completed: RwLock::new(HashMap::new()),
        }
    }

    /// Get an active record by id
    pub async fn get_active(&self, id: &str) -> Option<WordQueryRecord> {
        self.active.read().await.get(id).cloned()
    }

    pub async fn active_len(&self) -> usize {
        self.active.read().await.len()
    }

    pub async fn completed_len(&self) -> usize {
        self.completed.read().await.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn scan_active(&self) -> Result<ActiveScan> {
        let records: Vec<_> = self.active.read().await.values().cloned().collect();
        Ok(records.into())
    }

    async fn query_active_by_status(&self, status: QueryStatus) -> Result<Vec<WordQueryRecord>> {
        Ok(self
            .active
            .read()
            .await
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn put_active(&self, record: &WordQueryRecord) -> Result<()> {
        self.active
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update_active(&self, record: &WordQueryRecord) -> Result<()> {
        let mut active = self.active.write().await;
        match active.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(ReconcileError::NotFound(format!(
                "active record {}",
                record.id
            ))),
        }
    }

    async fn delete_active(&self, id: &str) -> Result<()> {
        self.active.write().await.remove(id);
        Ok(())
    }

    async fn put_completed(&self, record: &CompletedWordQueryRecord) -> Result<()> {
        self.completed
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_completed(&self, id: &str) -> Result<Option<CompletedWordQueryRecord>> {
        Ok(self.completed.read().await.get(id).cloned())
    }

    async fn scan_completed(&self) -> Result<Vec<CompletedWordQueryRecord>> {
        Ok(self.completed.read().await.values().cloned().collect())
    }
}
