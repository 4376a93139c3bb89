//! Engine properties over in-memory collaborators

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::common::fixtures::remote_batch;
    use crate::common::{OutputFileBuilder, RecordFactory, ScriptedBatchClient};
    use word_query_reconciler::core::batch::{RemoteBatchStatus, UpdateMessage, group_by_batch};
    use word_query_reconciler::services::InMemoryPublisher;
    use word_query_reconciler::storage::InMemoryRecordStore;
    use word_query_reconciler::{
        BatchOutcome, EngineConfig, QueryStatus, RecordStore, ReconciliationEngine,
    };

    const QUEUE: &str = "word-updates";

    struct Harness {
        store: Arc<InMemoryRecordStore>,
        client: Arc<ScriptedBatchClient>,
        publisher: Arc<InMemoryPublisher>,
        engine: ReconciliationEngine,
    }

    fn harness(records: Vec<word_query_reconciler::WordQueryRecord>) -> Harness {
        let store = Arc::new(InMemoryRecordStore::with_active(records));
        let client = Arc::new(ScriptedBatchClient::new());
        let publisher = Arc::new(InMemoryPublisher::new());
        let engine = ReconciliationEngine::new(
            store.clone(),
            client.clone(),
            publisher.clone(),
            EngineConfig::new(QUEUE),
        );
        Harness {
            store,
            client,
            publisher,
            engine,
        }
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let mut records = Vec::new();
        for (batch, count) in [("batch_a", 3), ("batch_b", 1), ("batch_c", 5)] {
            for i in 0..count {
                records.push(RecordFactory::create(batch, &format!("{}-{}", batch, i)));
            }
        }
        let all_ids: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();

        let groups = group_by_batch(records);

        assert_eq!(groups.len(), 3);
        let mut seen = HashSet::new();
        for (batch_id, members) in &groups {
            assert!(!members.is_empty());
            for record in members {
                assert_eq!(&record.batch_request_id, batch_id);
                assert!(seen.insert(record.id.clone()), "record in two groups");
            }
        }
        assert_eq!(seen, all_ids);
        assert_eq!(groups["batch_c"].len(), 5);
    }

    #[tokio::test]
    async fn test_terminal_status_is_monotonic() {
        let h = harness(RecordFactory::batch("batch_1", &["a", "b"]));
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Cancelled));

        h.engine.run_pass().await;

        // a later report of a different status changes nothing
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::InProgress));
        let second = h.engine.run_pass().await;

        assert!(second.batches.is_empty());
        assert_eq!(h.store.active_len().await, 0);
        let completed = h.store.scan_completed().await.unwrap();
        assert_eq!(completed.len(), 2);
        assert!(completed.iter().all(|r| r.status == QueryStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_non_terminal_polling_is_idempotent() {
        let records = RecordFactory::batch("batch_1", &["a", "b"]);
        let id = records[0].id.clone();
        let h = harness(records);
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Finalizing));

        let mut last_update = h.store.get_active(&id).await.unwrap().updated_at;
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let report = h.engine.run_pass().await;
            assert!(!report.has_errors());

            let record = h.store.get_active(&id).await.unwrap();
            assert_eq!(record.status, QueryStatus::InProgress);
            assert!(record.updated_at > last_update);
            last_update = record.updated_at;
        }

        assert_eq!(h.store.completed_len().await, 0);
        assert_eq!(h.client.fetch_calls(), 0);
        assert!(h.publisher.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_validating_batch_stays_awaiting_response() {
        let records = RecordFactory::batch("batch_1", &["a"]);
        let id = records[0].id.clone();
        let h = harness(records);
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Validating));

        h.engine.run_pass().await;

        let record = h.store.get_active(&id).await.unwrap();
        assert_eq!(record.status, QueryStatus::AwaitingResponse);
    }

    #[tokio::test]
    async fn test_fan_out_with_missing_word() {
        let h = harness(RecordFactory::batch("batch_1", &["a", "b", "c"]));
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Completed));
        h.client.set_file(
            "file-out-batch_1",
            OutputFileBuilder::new().results(&["a", "b"]).build(),
        );

        let report = h.engine.run_pass().await;

        let messages = h.publisher.messages().await;
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|(queue, _)| queue == QUEUE));
        let words: HashSet<String> = messages
            .iter()
            .map(|(_, body)| serde_json::from_str::<UpdateMessage>(body).unwrap().word)
            .collect();
        assert_eq!(words, HashSet::from(["a".to_string(), "b".to_string()]));

        assert_eq!(h.store.active_len().await, 0);
        let completed = h.store.scan_completed().await.unwrap();
        assert_eq!(completed.len(), 3);
        assert!(completed.iter().all(|r| r.status == QueryStatus::Completed));

        let batch = report.batch("batch_1").unwrap();
        assert_eq!(batch.missing_words, vec!["c"]);
        assert!(!report.has_errors());
    }

    #[tokio::test]
    async fn test_foreign_result_is_ignored() {
        let h = harness(RecordFactory::batch("batch_1", &["a", "b", "c"]));
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Completed));
        h.client.set_file(
            "file-out-batch_1",
            OutputFileBuilder::new()
                .results(&["a", "d", "b", "c"])
                .build(),
        );

        let report = h.engine.run_pass().await;

        assert_eq!(h.publisher.published_words().await, vec!["a", "b", "c"]);
        let batch = report.batch("batch_1").unwrap();
        assert_eq!(batch.ignored_words, vec!["d"]);
        assert!(batch.missing_words.is_empty());
        assert!(!report.has_errors());
    }

    #[tokio::test]
    async fn test_malformed_line_publishes_nothing() {
        let h = harness(RecordFactory::batch("batch_1", &["a", "b", "c"]));
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Completed));
        h.client.set_file(
            "file-out-batch_1",
            OutputFileBuilder::new()
                .results(&["a", "b"])
                .raw(r#"{"word": "c", "offensiveness": "#)
                .build(),
        );

        let report = h.engine.run_pass().await;

        assert!(h.publisher.messages().await.is_empty());
        assert_eq!(h.store.active_len().await, 3);
        assert_eq!(h.store.completed_len().await, 0);
        assert!(matches!(
            report.batch("batch_1").unwrap().outcome,
            BatchOutcome::Aborted { .. }
        ));
    }

    #[tokio::test]
    async fn test_envelope_output_with_failed_request() {
        let h = harness(RecordFactory::batch("batch_1", &["a", "b"]));
        h.client
            .set_batch(remote_batch("batch_1", RemoteBatchStatus::Completed));
        h.client.set_file(
            "file-out-batch_1",
            OutputFileBuilder::new()
                .envelope("a")
                .failed_envelope("b")
                .build(),
        );

        let report = h.engine.run_pass().await;

        assert_eq!(h.publisher.published_words().await, vec!["a"]);
        let batch = report.batch("batch_1").unwrap();
        assert_eq!(batch.resolved_words, vec!["a"]);
        assert_eq!(batch.missing_words, vec!["b"]);
        assert_eq!(h.store.completed_len().await, 2);
    }

    #[tokio::test]
    async fn test_many_batches_all_reported_in_order() {
        let mut records = Vec::new();
        for i in 0..10 {
            let batch_id = format!("batch_{:02}", i);
            records.extend(RecordFactory::batch(&batch_id, &["w"]));
        }
        let h = harness(records);
        for i in 0..10 {
            let batch_id = format!("batch_{:02}", i);
            h.client
                .set_batch(remote_batch(&batch_id, RemoteBatchStatus::Failed));
            h.client.delay_lookup(&batch_id, Duration::from_millis(10));
        }

        let report = h.engine.run_pass().await;

        let ids: Vec<&str> = report.batches.iter().map(|b| b.batch_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 10);
        assert_eq!(h.client.retrieve_calls(), 10);
        assert_eq!(report.summary().batches_completed, 10);
        assert_eq!(h.store.active_len().await, 0);
    }
}
