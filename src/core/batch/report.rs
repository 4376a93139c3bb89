//! Pass and batch reports
//!
//! A pass never fails as a whole; everything that went wrong is recorded
//! here, per batch and per record, for the scheduler or operator to act on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::parser::FailedRequest;
use super::types::{QueryStatus, RemoteBatchStatus, UndecodableRecord};

/// Why a batch was left untouched this pass
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The batch API does not know the job
    NotFound,
    /// The status lookup exceeded the remote timeout
    Timeout,
    /// The status lookup failed in a way that may clear up on its own
    LookupFailed(String),
    /// The batch API refused the lookup (bad credentials, bad request)
    LookupRejected(String),
    /// The output file could not be fetched
    OutputUnavailable(String),
}

/// What a pass did to one batch
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Records left untouched, retried next pass
    Skipped { reason: SkipReason },
    /// Non-terminal status written in place
    Refreshed { status: QueryStatus },
    /// Terminal status reached and records moved to the completed table
    Completed { status: QueryStatus },
    /// Job not found for longer than the staleness ceiling, marked failed
    Abandoned { age_hours: i64 },
    /// Fatal condition for this batch, records left untouched
    Aborted { reason: String },
}

/// Step at which a record-level failure occurred
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Publish,
    UpdateActive,
    PutCompleted,
    DeleteActive,
    FollowUp,
}

/// A failure tied to one record or word
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordFailure {
    pub stage: FailureStage,
    pub record_id: Option<String>,
    pub word: Option<String>,
    pub message: String,
}

/// Result of fanning one completed batch out to the update queue
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanoutReport {
    /// Words whose update message was published
    pub resolved: Vec<String>,
    /// Outstanding words with no result line
    pub missing: Vec<String>,
    /// Result words that were not outstanding in this batch
    pub ignored: Vec<String>,
    /// Words whose message could not be published, with the error
    pub unpublished: Vec<(String, String)>,
    /// Requests the remote side reported as failed
    #[serde(skip)]
    pub failed_requests: Vec<FailedRequest>,
}

/// Outcome of one batch within a pass
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub record_count: usize,
    pub remote_status: Option<RemoteBatchStatus>,
    pub outcome: BatchOutcome,
    pub resolved_words: Vec<String>,
    pub missing_words: Vec<String>,
    pub ignored_words: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub fn new(batch_id: impl Into<String>, record_count: usize) -> Self {
        Self {
            batch_id: batch_id.into(),
            record_count,
            remote_status: None,
            outcome: BatchOutcome::Skipped {
                reason: SkipReason::NotFound,
            },
            resolved_words: Vec::new(),
            missing_words: Vec::new(),
            ignored_words: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn skipped(mut self, reason: SkipReason) -> Self {
        self.outcome = BatchOutcome::Skipped { reason };
        self
    }

    pub fn record_failure(
        &mut self,
        stage: FailureStage,
        record_id: Option<&str>,
        word: Option<&str>,
        message: impl Into<String>,
    ) {
        self.failures.push(RecordFailure {
            stage,
            record_id: record_id.map(str::to_string),
            word: word.map(str::to_string),
            message: message.into(),
        });
    }

    /// Whether this batch's records were written this pass
    pub fn advanced(&self) -> bool {
        matches!(
            self.outcome,
            BatchOutcome::Refreshed { .. }
                | BatchOutcome::Completed { .. }
                | BatchOutcome::Abandoned { .. }
        )
    }

    /// Errors counted against the pass: aborted batches, lookup failures and
    /// record-level failures.
    pub fn error_count(&self) -> usize {
        let batch_level = match &self.outcome {
            BatchOutcome::Aborted { .. } => 1,
            BatchOutcome::Skipped {
                reason:
                    SkipReason::LookupFailed(_) | SkipReason::LookupRejected(_) | SkipReason::Timeout,
            } => 1,
            _ => 0,
        };
        batch_level + self.failures.len()
    }
}

/// Aggregated result of one reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Correlates the pass's log lines with its report
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the active table could not be read; no batch was visited
    pub scan_error: Option<String>,
    /// Active rows skipped because they could not be decoded
    pub undecodable_records: Vec<UndecodableRecord>,
    pub batches: Vec<BatchReport>,
}

/// Counts for logs and exit codes
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PassSummary {
    pub batches_seen: usize,
    pub batches_advanced: usize,
    pub batches_completed: usize,
    pub batches_skipped: usize,
    pub words_resolved: usize,
    pub words_missing: usize,
    pub errors: usize,
}

impl PassReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            started_at,
            finished_at: started_at,
            scan_error: None,
            undecodable_records: Vec::new(),
            batches: Vec::new(),
        }
    }

    pub fn summary(&self) -> PassSummary {
        let mut summary = PassSummary {
            batches_seen: self.batches.len(),
            errors: usize::from(self.scan_error.is_some()) + self.undecodable_records.len(),
            ..PassSummary::default()
        };

        for batch in &self.batches {
            if batch.advanced() {
                summary.batches_advanced += 1;
            }
            match batch.outcome {
                BatchOutcome::Completed { .. } | BatchOutcome::Abandoned { .. } => {
                    summary.batches_completed += 1
                }
                BatchOutcome::Skipped { .. } => summary.batches_skipped += 1,
                _ => {}
            }
            summary.words_resolved += batch.resolved_words.len();
            summary.words_missing += batch.missing_words.len();
            summary.errors += batch.error_count();
        }

        summary
    }

    /// Batch report by id
    pub fn batch(&self, batch_id: &str) -> Option<&BatchReport> {
        self.batches.iter().find(|b| b.batch_id == batch_id)
    }

    pub fn has_errors(&self) -> bool {
        self.summary().errors > 0
    }
}
