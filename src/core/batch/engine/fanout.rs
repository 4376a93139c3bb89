//! Output file retrieval and update message publishing

use std::collections::HashSet;
use tracing::{debug, warn};

use super::super::parser::parse_batch_output;
use super::super::report::FanoutReport;
use super::super::types::{RemoteBatch, UpdateMessage, WordQueryRecord};
use super::core::ReconciliationEngine;
use crate::utils::error::{FanoutError, ReconcileError};

impl ReconciliationEngine {
    /// Fan a successfully completed batch out to the update queue.
    ///
    /// The whole output file is parsed before anything is published, so a
    /// malformed file publishes nothing. Each message is published before its
    /// record leaves the active table; the caller commits afterwards.
    pub(super) async fn resolve_batch_results(
        &self,
        batch: &RemoteBatch,
        records: &[WordQueryRecord],
    ) -> Result<FanoutReport, FanoutError> {
        let file_id = batch
            .output_file_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FanoutError::MissingOutputFile {
                batch_id: batch.id.clone(),
            })?;

        let file = match tokio::time::timeout(
            self.config.remote_timeout,
            self.batch_client.fetch_output_file(file_id),
        )
        .await
        {
            Ok(Ok(file)) => file,
            Ok(Err(source)) => {
                return Err(FanoutError::OutputFetch {
                    file_id: file_id.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(FanoutError::OutputFetch {
                    file_id: file_id.to_string(),
                    source: ReconcileError::Timeout(format!(
                        "output file fetch exceeded {:?}",
                        self.config.remote_timeout
                    )),
                });
            }
        };

        if !file.is_success() {
            return Err(FanoutError::OutputStatus {
                file_id: file_id.to_string(),
                status: file.status,
            });
        }

        let parsed = parse_batch_output(&file.body)?;
        debug!(
            "Batch {} output parsed: {} result(s), {} failed request(s)",
            batch.id,
            parsed.results.len(),
            parsed.failed_requests.len()
        );

        let mut report = FanoutReport::default();
        for failed in &parsed.failed_requests {
            warn!(
                "Batch {} request {} failed remotely (line {}): {}",
                batch.id,
                failed.custom_id.as_deref().unwrap_or("<unknown>"),
                failed.line,
                failed.reason
            );
        }
        report.failed_requests = parsed.failed_requests;

        let mut outstanding: HashSet<&str> = records.iter().map(|r| r.word.as_str()).collect();

        for result in parsed.results {
            if !outstanding.contains(result.word.as_str()) {
                warn!(
                    "Ignoring result for '{}': not outstanding in batch {}",
                    result.word, batch.id
                );
                report.ignored.push(result.word);
                continue;
            }

            let word = result.word.clone();
            outstanding.remove(word.as_str());

            match self.publish_update(UpdateMessage::from(result)).await {
                Ok(()) => {
                    debug!("Published update for '{}'", word);
                    report.resolved.push(word);
                }
                Err(e) => {
                    warn!("Failed to publish update for '{}': {}", word, e);
                    report.unpublished.push((word, e.to_string()));
                }
            }
        }

        let mut missing: Vec<String> = outstanding.into_iter().map(str::to_string).collect();
        missing.sort_unstable();
        if !missing.is_empty() {
            warn!(
                "Batch {} output has no result for {} word(s): {:?}",
                batch.id,
                missing.len(),
                missing
            );
        }
        report.missing = missing;

        Ok(report)
    }

    async fn publish_update(&self, message: UpdateMessage) -> Result<(), ReconcileError> {
        let body = serde_json::to_string(&message)?;
        tokio::time::timeout(
            self.config.remote_timeout,
            self.publisher.publish(&self.config.queue, &body),
        )
        .await
        .map_err(|_| {
            ReconcileError::Timeout(format!(
                "publish exceeded {:?}",
                self.config.remote_timeout
            ))
        })?
    }
}
