//! Core ReconciliationEngine struct and the pass driver

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::super::grouping::group_by_batch;
use super::super::report::PassReport;
use crate::core::traits::{
    BatchJobClient, MessagePublisher, MissingWordHandler, RecordStore, ReportOnly,
};

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Queue reference update messages are published to
    pub queue: String,
    /// Maximum batches processed at once (default: 4)
    pub concurrency: usize,
    /// Timeout applied to every batch API and queue call (default: 30s)
    pub remote_timeout: Duration,
    /// How long a batch may stay unknown to the batch API before it is
    /// marked failed (default: 72h). `None` skips such batches forever.
    pub not_found_ceiling: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue: String::new(),
            concurrency: 4,
            remote_timeout: Duration::from_secs(30),
            not_found_ceiling: Some(Duration::from_secs(72 * 3600)),
        }
    }
}

impl EngineConfig {
    /// Create a new config publishing to `queue`
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
            ..Self::default()
        }
    }

    /// Set concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set timeout per remote call
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Set the not-found staleness ceiling
    pub fn with_not_found_ceiling(mut self, ceiling: Option<Duration>) -> Self {
        self.not_found_ceiling = ceiling;
        self
    }
}

/// Drives active word queries through their batch job's lifecycle
pub struct ReconciliationEngine {
    pub(super) store: Arc<dyn RecordStore>,
    pub(super) batch_client: Arc<dyn BatchJobClient>,
    pub(super) publisher: Arc<dyn MessagePublisher>,
    pub(super) missing_words: Arc<dyn MissingWordHandler>,
    pub(super) config: EngineConfig,
}

impl ReconciliationEngine {
    /// Create a new engine. Missing words are only reported until a handler
    /// is set with [`Self::with_missing_word_handler`].
    pub fn new(
        store: Arc<dyn RecordStore>,
        batch_client: Arc<dyn BatchJobClient>,
        publisher: Arc<dyn MessagePublisher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            batch_client,
            publisher,
            missing_words: Arc::new(ReportOnly),
            config,
        }
    }

    pub fn with_missing_word_handler(mut self, handler: Arc<dyn MissingWordHandler>) -> Self {
        self.missing_words = handler;
        self
    }

    /// Get current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one reconciliation pass over every active record.
    ///
    /// Never fails: a pass that cannot read the active table returns a report
    /// with `scan_error` set, and every batch-level problem is recorded in
    /// that batch's report.
    pub async fn run_pass(&self) -> PassReport {
        let mut report = PassReport::new(Utc::now());

        let scan = match self.store.scan_active().await {
            Ok(scan) => scan,
            Err(e) => {
                error!("Pass {}: failed to scan active word queries: {}", report.pass_id, e);
                report.scan_error = Some(e.to_string());
                report.finished_at = Utc::now();
                return report;
            }
        };

        if !scan.undecodable.is_empty() {
            warn!(
                "Pass {}: skipping {} undecodable active record(s)",
                report.pass_id,
                scan.undecodable.len()
            );
        }
        report.undecodable_records = scan.undecodable;

        let groups = group_by_batch(scan.records);
        info!(
            "Reconciliation pass {} started: {} batch(es) outstanding",
            report.pass_id,
            groups.len()
        );

        let mut batches: Vec<_> = stream::iter(groups)
            .map(|(batch_id, records)| self.process_batch(batch_id, records))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;
        batches.sort_by(|a, b| a.batch_id.cmp(&b.batch_id));

        report.batches = batches;
        report.finished_at = Utc::now();

        let summary = report.summary();
        info!(
            "Reconciliation pass {} finished: {} batch(es), {} advanced, {} completed, {} skipped, {} word(s) resolved, {} missing, {} error(s)",
            report.pass_id,
            summary.batches_seen,
            summary.batches_advanced,
            summary.batches_completed,
            summary.batches_skipped,
            summary.words_resolved,
            summary.words_missing,
            summary.errors
        );

        report
    }
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
