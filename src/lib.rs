//! # word-query-reconciler
//!
//! Reconciles word-query jobs submitted to the OpenAI Batch API.
//!
//! Each pass reads the active word query records, groups them by batch job,
//! and asks the batch API where each job stands:
//!
//! - **Still running**: every record in the group gets the current status.
//! - **Completed**: the output file is fetched and parsed, one update message
//!   per resolved word is published, and the records move to the completed
//!   table.
//! - **Failed, expired or cancelled**: the records move to the completed table
//!   with that status.
//! - **Unknown to the API**: the group is left for the next pass until it is
//!   older than the staleness ceiling.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use word_query_reconciler::{
//!     Config, OpenAiBatchClient, ReconciliationEngine, services, storage,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!
//!     let store = storage::open_record_store(&config.database).await?;
//!     let client = Arc::new(OpenAiBatchClient::new(&config.openai)?);
//!     let publisher = services::build_publisher(&config.queue).await?;
//!
//!     let engine = ReconciliationEngine::new(store, client, publisher, config.engine_config());
//!     let report = engine.run_pass().await;
//!     println!("{:?}", report.summary());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{FanoutError, ReconcileError, Result};

pub use crate::core::batch::{
    BatchOutcome, BatchReport, EngineConfig, PassReport, PassSummary, QueryStatus,
    ReconciliationEngine, WordQueryRecord,
};
pub use crate::core::providers::OpenAiBatchClient;
pub use crate::core::traits::{
    BatchJobClient, MessagePublisher, MissingWordHandler, RecordStore, ReportOnly,
};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Reconciler build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            git_hash: env!("RECONCILER_GIT_HASH"),
        }
    }
}

/// Build information for this binary
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
