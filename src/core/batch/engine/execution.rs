//! Per-batch state machine and store commits

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use super::super::report::{BatchOutcome, BatchReport, FailureStage, SkipReason};
use super::super::types::{CompletedWordQueryRecord, QueryStatus, RemoteBatch, WordQueryRecord};
use super::core::ReconciliationEngine;

impl ReconciliationEngine {
    /// Process one batch group. Always returns a report; nothing here aborts
    /// the pass.
    pub(super) async fn process_batch(
        &self,
        batch_id: String,
        records: Vec<WordQueryRecord>,
    ) -> BatchReport {
        debug!("Processing batch: {} ({} record(s))", batch_id, records.len());
        let report = BatchReport::new(batch_id.clone(), records.len());

        let lookup = tokio::time::timeout(
            self.config.remote_timeout,
            self.batch_client.retrieve(&batch_id),
        )
        .await;

        let batch = match lookup {
            Err(_) => {
                warn!(
                    "Batch {} lookup timed out after {:?}, retrying next pass",
                    batch_id, self.config.remote_timeout
                );
                return report.skipped(SkipReason::Timeout);
            }
            Ok(Err(e)) if e.is_transient() => {
                warn!("Batch {} lookup failed, retrying next pass: {}", batch_id, e);
                return report.skipped(SkipReason::LookupFailed(e.to_string()));
            }
            Ok(Err(e)) => {
                error!(
                    "Batch {} lookup rejected, needs attention before it can advance: {}",
                    batch_id, e
                );
                return report.skipped(SkipReason::LookupRejected(e.to_string()));
            }
            Ok(Ok(None)) => return self.handle_not_found(report, records).await,
            Ok(Ok(Some(batch))) => batch,
        };

        self.advance_batch(report, batch, records).await
    }

    /// Apply a known remote status to the group
    async fn advance_batch(
        &self,
        mut report: BatchReport,
        batch: RemoteBatch,
        records: Vec<WordQueryRecord>,
    ) -> BatchReport {
        let status = batch.status.to_query_status();
        report.remote_status = Some(batch.status.clone());
        let now = Utc::now();

        if !status.is_terminal() {
            debug!("Batch {} still running ({:?})", batch.id, batch.status);
            for mut record in records {
                if record.refresh_status(status, now) {
                    self.update_in_place(&mut report, &record).await;
                } else {
                    debug!(
                        "Record {} stays {} while batch {} reports {:?}",
                        record.id, record.status, batch.id, batch.status
                    );
                }
            }
            report.outcome = BatchOutcome::Refreshed { status };
            return report;
        }

        let mut held_back: HashSet<String> = HashSet::new();
        let mut missing: HashSet<String> = HashSet::new();

        if status == QueryStatus::Completed {
            match self.resolve_batch_results(&batch, &records).await {
                Ok(fanout) => {
                    for (word, message) in &fanout.unpublished {
                        report.record_failure(
                            FailureStage::Publish,
                            None,
                            Some(word.as_str()),
                            message,
                        );
                        held_back.insert(word.clone());
                    }
                    missing.extend(fanout.missing.iter().cloned());
                    report.resolved_words = fanout.resolved;
                    report.missing_words = fanout.missing;
                    report.ignored_words = fanout.ignored;
                }
                Err(e) if e.is_retriable() => {
                    warn!("Batch {} output unavailable, retrying next pass: {}", batch.id, e);
                    return report.skipped(SkipReason::OutputUnavailable(e.to_string()));
                }
                Err(e) => {
                    error!("Batch {} cannot be resolved: {}", batch.id, e);
                    report.outcome = BatchOutcome::Aborted {
                        reason: e.to_string(),
                    };
                    return report;
                }
            }
        }

        let mut moved_missing = Vec::new();
        for mut record in records {
            record.refresh_status(status, now);

            // Unpublished words stay active with the terminal status so the
            // next pass retries them alone.
            if held_back.contains(&record.word) {
                self.update_in_place(&mut report, &record).await;
                continue;
            }

            if self.move_to_completed(&mut report, &record, now).await
                && missing.contains(&record.word)
            {
                moved_missing.push(record);
            }
        }

        info!(
            "Batch {} reached {}: {} resolved, {} missing",
            batch.id,
            status,
            report.resolved_words.len(),
            report.missing_words.len()
        );
        report.outcome = BatchOutcome::Completed { status };

        if !moved_missing.is_empty() {
            if let Err(e) = self
                .missing_words
                .handle_missing(&batch.id, &moved_missing)
                .await
            {
                error!("Missing-word follow-up failed for batch {}: {}", batch.id, e);
                report.record_failure(FailureStage::FollowUp, None, None, e.to_string());
            }
        }

        report
    }

    /// The batch API does not know this job. Skip it, unless the group has
    /// been waiting longer than the staleness ceiling.
    async fn handle_not_found(
        &self,
        mut report: BatchReport,
        records: Vec<WordQueryRecord>,
    ) -> BatchReport {
        let now = Utc::now();
        let oldest = records.iter().map(|r| r.created_at).min();

        let age = match (self.config.not_found_ceiling, oldest) {
            (Some(ceiling), Some(oldest)) => {
                let age = now - oldest;
                let ceiling =
                    chrono::Duration::from_std(ceiling).unwrap_or(chrono::Duration::MAX);
                (age > ceiling).then_some(age)
            }
            _ => None,
        };

        let Some(age) = age else {
            warn!("Batch {} not found, retrying next pass", report.batch_id);
            return report.skipped(SkipReason::NotFound);
        };

        warn!(
            "Batch {} not found for {}h, marking {} record(s) failed",
            report.batch_id,
            age.num_hours(),
            records.len()
        );
        for mut record in records {
            record.refresh_status(QueryStatus::Failed, now);
            self.move_to_completed(&mut report, &record, now).await;
        }
        report.outcome = BatchOutcome::Abandoned {
            age_hours: age.num_hours(),
        };
        report
    }

    async fn update_in_place(&self, report: &mut BatchReport, record: &WordQueryRecord) {
        if let Err(e) = self.store.update_active(record).await {
            error!("Failed to update active record {}: {}", record.id, e);
            report.record_failure(
                FailureStage::UpdateActive,
                Some(record.id.as_str()),
                Some(record.word.as_str()),
                e.to_string(),
            );
        }
    }

    /// Write the completed copy, then delete the active original. The active
    /// record is only deleted once the completed write succeeded. Returns
    /// whether both steps succeeded.
    async fn move_to_completed(
        &self,
        report: &mut BatchReport,
        record: &WordQueryRecord,
        completed_at: DateTime<Utc>,
    ) -> bool {
        let completed = CompletedWordQueryRecord::from_active(record, completed_at);

        if let Err(e) = self.store.put_completed(&completed).await {
            error!("Failed to write completed record {}: {}", record.id, e);
            report.record_failure(
                FailureStage::PutCompleted,
                Some(record.id.as_str()),
                Some(record.word.as_str()),
                e.to_string(),
            );
            return false;
        }

        if let Err(e) = self.store.delete_active(&record.id).await {
            error!(
                "Completed record {} written but active copy not deleted: {}",
                record.id, e
            );
            report.record_failure(
                FailureStage::DeleteActive,
                Some(record.id.as_str()),
                Some(record.word.as_str()),
                e.to_string(),
            );
            return false;
        }

        debug!("Moved record {} ({}) to completed", record.id, record.word);
        true
    }
}
