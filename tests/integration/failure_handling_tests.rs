//! Store, transport and publish failures across passes

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::common::fixtures::remote_batch;
    use crate::common::{FlakyStore, OutputFileBuilder, RecordFactory, ScriptedBatchClient};
    use word_query_reconciler::core::batch::{FailureStage, RemoteBatchStatus, SkipReason};
    use word_query_reconciler::services::InMemoryPublisher;
    use word_query_reconciler::{
        BatchOutcome, EngineConfig, QueryStatus, RecordStore, ReconciliationEngine,
    };

    struct Harness {
        store: Arc<FlakyStore>,
        client: Arc<ScriptedBatchClient>,
        publisher: Arc<InMemoryPublisher>,
        engine: ReconciliationEngine,
    }

    fn harness_with(
        records: Vec<word_query_reconciler::WordQueryRecord>,
        config: EngineConfig,
    ) -> Harness {
        let store = Arc::new(FlakyStore::with_active(records));
        let client = Arc::new(ScriptedBatchClient::new());
        let publisher = Arc::new(InMemoryPublisher::new());
        let engine =
            ReconciliationEngine::new(store.clone(), client.clone(), publisher.clone(), config);
        Harness {
            store,
            client,
            publisher,
            engine,
        }
    }

    fn harness(records: Vec<word_query_reconciler::WordQueryRecord>) -> Harness {
        harness_with(records, EngineConfig::new("word-updates"))
    }

    fn complete_with(h: &Harness, batch_id: &str, words: &[&str]) {
        h.client
            .set_batch(remote_batch(batch_id, RemoteBatchStatus::Completed));
        h.client.set_file(
            &format!("file-out-{}", batch_id),
            OutputFileBuilder::new().results(words).build(),
        );
    }

    #[tokio::test]
    async fn test_crash_between_completed_write_and_delete() {
        let records = RecordFactory::batch("batch_1", &["a", "b"]);
        let a_id = records[0].id.clone();
        let h = harness(records);
        complete_with(&h, "batch_1", &["a", "b"]);

        h.store.fail_delete_active(&a_id);
        let first = h.engine.run_pass().await;

        let failures = &first.batch("batch_1").unwrap().failures;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, FailureStage::DeleteActive);
        // the word is still active and re-resolvable
        assert!(h.store.inner().get_active(&a_id).await.is_some());
        assert!(h.store.get_completed(&a_id).await.unwrap().is_some());

        h.store.heal();
        let second = h.engine.run_pass().await;

        assert!(!second.has_errors());
        assert_eq!(second.batch("batch_1").unwrap().resolved_words, vec!["a"]);
        assert_eq!(h.store.inner().active_len().await, 0);
        assert_eq!(h.store.inner().completed_len().await, 2);
        // duplicate delivery of "a" is acceptable
        assert_eq!(h.publisher.published_words().await, vec!["a", "b", "a"]);
    }

    #[tokio::test]
    async fn test_failed_completed_write_keeps_active_record() {
        let records = RecordFactory::batch("batch_1", &["a", "b"]);
        let a_id = records[0].id.clone();
        let h = harness(records);
        complete_with(&h, "batch_1", &["a", "b"]);

        h.store.fail_put_completed("a");
        let report = h.engine.run_pass().await;

        let batch = report.batch("batch_1").unwrap();
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].stage, FailureStage::PutCompleted);
        assert_eq!(batch.failures[0].word.as_deref(), Some("a"));

        assert!(h.store.inner().get_active(&a_id).await.is_some());
        assert!(h.store.get_completed(&a_id).await.unwrap().is_none());
        // the rest of the batch still committed
        assert_eq!(h.store.inner().completed_len().await, 1);
    }

    #[tokio::test]
    async fn test_store_failure_in_one_batch_does_not_block_another() {
        let mut records = RecordFactory::batch("batch_x", &["x"]);
        records.extend(RecordFactory::batch("batch_y", &["y1", "y2"]));
        let h = harness(records);
        complete_with(&h, "batch_x", &["x"]);
        complete_with(&h, "batch_y", &["y1", "y2"]);

        h.store.fail_put_completed("x");
        let report = h.engine.run_pass().await;

        assert_eq!(report.batch("batch_x").unwrap().error_count(), 1);
        let y = report.batch("batch_y").unwrap();
        assert!(y.failures.is_empty());
        assert_eq!(y.resolved_words, vec!["y1", "y2"]);

        let remaining = h.store.scan_active().await.unwrap().records;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].word, "x");
    }

    #[tokio::test]
    async fn test_unpublished_word_retried_alone() {
        let h = harness(RecordFactory::batch("batch_1", &["a", "b", "c"]));
        complete_with(&h, "batch_1", &["a", "b", "c"]);

        h.publisher.fail_word("b").await;
        let first = h.engine.run_pass().await;

        assert_eq!(first.batch("batch_1").unwrap().resolved_words, vec!["a", "c"]);
        let held = h.store.scan_active().await.unwrap().records;
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].word, "b");
        assert_eq!(held[0].status, QueryStatus::Completed);

        h.publisher.recover().await;
        let second = h.engine.run_pass().await;

        let batch = second.batch("batch_1").unwrap();
        assert_eq!(batch.record_count, 1);
        assert_eq!(batch.resolved_words, vec!["b"]);
        // results for words already moved are foreign now
        assert_eq!(batch.ignored_words, vec!["a", "c"]);
        assert!(!second.has_errors());
        assert_eq!(h.publisher.published_words().await, vec!["a", "c", "b"]);
        assert_eq!(h.store.inner().completed_len().await, 3);
    }

    #[tokio::test]
    async fn test_output_fetch_failure_retried_next_pass() {
        let h = harness(RecordFactory::batch("batch_1", &["a"]));
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Completed));

        // no file registered yet: the fake answers 404
        let first = h.engine.run_pass().await;
        assert!(matches!(
            first.batch("batch_1").unwrap().outcome,
            BatchOutcome::Skipped {
                reason: SkipReason::OutputUnavailable(_)
            }
        ));
        assert_eq!(h.store.inner().active_len().await, 1);

        complete_with(&h, "batch_1", &["a"]);
        let second = h.engine.run_pass().await;
        assert!(second.batch("batch_1").unwrap().advanced());
        assert_eq!(h.store.inner().active_len().await, 0);
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out() {
        let h = harness_with(
            RecordFactory::batch("batch_slow", &["a"]),
            EngineConfig::new("word-updates").with_remote_timeout(Duration::from_millis(20)),
        );
        h.client
            .set_batch(remote_batch("batch_slow", RemoteBatchStatus::Failed));
        h.client
            .delay_lookup("batch_slow", Duration::from_secs(2));

        let report = h.engine.run_pass().await;

        assert_eq!(
            report.batch("batch_slow").unwrap().outcome,
            BatchOutcome::Skipped {
                reason: SkipReason::Timeout
            }
        );
        assert_eq!(h.store.inner().active_len().await, 1);
    }

    #[tokio::test]
    async fn test_transport_errors_never_abandon_a_batch() {
        let h = harness(vec![RecordFactory::aged(
            "batch_1",
            "a",
            ChronoDuration::hours(500),
        )]);
        h.client.fail_lookup("batch_1");

        let report = h.engine.run_pass().await;

        assert!(matches!(
            report.batch("batch_1").unwrap().outcome,
            BatchOutcome::Skipped {
                reason: SkipReason::LookupFailed(_)
            }
        ));
        assert_eq!(h.store.inner().active_len().await, 1);
    }

    #[tokio::test]
    async fn test_not_found_abandoned_only_past_ceiling() {
        let h = harness_with(
            vec![
                RecordFactory::aged("batch_old", "a", ChronoDuration::hours(30)),
                RecordFactory::aged("batch_new", "b", ChronoDuration::hours(2)),
            ],
            EngineConfig::new("word-updates")
                .with_not_found_ceiling(Some(Duration::from_secs(24 * 3600))),
        );

        let report = h.engine.run_pass().await;

        assert!(matches!(
            report.batch("batch_old").unwrap().outcome,
            BatchOutcome::Abandoned { age_hours: 30 }
        ));
        assert_eq!(
            report.batch("batch_new").unwrap().outcome,
            BatchOutcome::Skipped {
                reason: SkipReason::NotFound
            }
        );

        let active = h.store.scan_active().await.unwrap().records;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].word, "b");
        let completed = h.store.scan_completed().await.unwrap();
        assert_eq!(completed[0].status, QueryStatus::Failed);
    }

    #[tokio::test]
    async fn test_scan_failure_reported() {
        let h = harness(RecordFactory::batch("batch_1", &["a"]));
        h.store.fail_scan(true);

        let report = h.engine.run_pass().await;

        assert!(report.scan_error.is_some());
        assert!(report.batches.is_empty());
        assert!(report.has_errors());
        assert_eq!(h.client.retrieve_calls(), 0);
    }
}
