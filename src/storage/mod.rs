//! Storage layer for the reconciler
//!
//! Record store backends for active and completed word queries.

/// Database storage module
pub mod database;
/// In-memory storage module
pub mod memory;

pub use database::SeaOrmRecordStore;
pub use memory::InMemoryRecordStore;

use crate::config::DatabaseConfig;
use crate::core::traits::RecordStore;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the record store named by the configuration.
///
/// The special URL `memory://` selects the in-memory store, which starts
/// empty and is lost when the process exits.
pub async fn open_record_store(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>> {
    if config.url.starts_with("memory://") {
        warn!("Using in-memory record store, nothing will be persisted");
        return Ok(Arc::new(InMemoryRecordStore::new()));
    }

    info!("Opening record store");
    Ok(Arc::new(SeaOrmRecordStore::connect(config).await?))
}
