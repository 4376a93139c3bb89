//! OpenAI batch client against a mock HTTP server

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::common::OutputFileBuilder;
    use word_query_reconciler::config::OpenAiConfig;
    use word_query_reconciler::core::batch::RemoteBatchStatus;
    use word_query_reconciler::{BatchJobClient, OpenAiBatchClient, ReconcileError};

    fn client_for(server: &MockServer, organization: Option<&str>) -> OpenAiBatchClient {
        let config = OpenAiConfig {
            api_key: "sk-test".to_string(),
            api_base: format!("{}/v1", server.uri()),
            organization: organization.map(str::to_string),
            timeout: 5,
        };
        OpenAiBatchClient::new(&config).unwrap()
    }

    fn batch_body(id: &str, status: &str, output_file_id: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "object": "batch",
            "endpoint": "/v1/chat/completions",
            "input_file_id": "file-in",
            "completion_window": "24h",
            "status": status,
            "output_file_id": output_file_id,
            "error_file_id": null,
            "created_at": 1714508499,
            "request_counts": {"total": 3, "completed": 3, "failed": 0}
        })
    }

    #[tokio::test]
    async fn test_retrieve_completed_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batches/batch_abc"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("OpenAI-Organization", "org-words"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(batch_body("batch_abc", "completed", Some("file-out"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("org-words"));
        let batch = client.retrieve("batch_abc").await.unwrap().unwrap();

        assert_eq!(batch.id, "batch_abc");
        assert_eq!(batch.status, RemoteBatchStatus::Completed);
        assert_eq!(batch.output_file_id.as_deref(), Some("file-out"));
        assert_eq!(batch.error_file_id, None);
    }

    #[tokio::test]
    async fn test_retrieve_running_batch_without_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batches/batch_abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(batch_body("batch_abc", "in_progress", None)),
            )
            .mount(&server)
            .await;

        let batch = client_for(&server, None)
            .retrieve("batch_abc")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(batch.status, RemoteBatchStatus::InProgress);
        assert_eq!(batch.output_file_id, None);
    }

    #[tokio::test]
    async fn test_retrieve_unknown_batch_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batches/batch_gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "No batch found with id 'batch_gone'.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server, None).retrieve("batch_gone").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_retrieve_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batches/batch_abc"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"message": "The engine is currently overloaded"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .retrieve("batch_abc")
            .await
            .unwrap_err();

        match &err {
            ReconcileError::Api { status, message } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "The engine is currently overloaded");
            }
            other => panic!("expected API error, got {:?}", other),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_retrieve_auth_error_is_not_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batches/batch_abc"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .retrieve("batch_abc")
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Api { status: 401, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_output_file_content() {
        let server = MockServer::start().await;
        let content = OutputFileBuilder::new()
            .envelope("apple")
            .result("pear")
            .to_ndjson();
        Mock::given(method("GET"))
            .and(path("/v1/files/file-out/content"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string(content.clone()))
            .mount(&server)
            .await;

        let file = client_for(&server, None)
            .fetch_output_file("file-out")
            .await
            .unwrap();

        assert!(file.is_success());
        assert_eq!(file.body, content.into_bytes());
    }

    #[tokio::test]
    async fn test_fetch_output_file_error_status_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-out/content"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let file = client_for(&server, None)
            .fetch_output_file("file-out")
            .await
            .unwrap();

        assert_eq!(file.status, 500);
        assert!(!file.is_success());
        assert_eq!(file.body, b"oops".to_vec());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        let config = OpenAiConfig {
            api_key: "sk-test".to_string(),
            // port 9 (discard) is closed on test machines
            api_base: "http://127.0.0.1:9/v1".to_string(),
            organization: None,
            timeout: 2,
        };
        let client = OpenAiBatchClient::new(&config).unwrap();

        let err = client.retrieve("batch_abc").await.unwrap_err();
        assert!(matches!(err, ReconcileError::HttpClient(_)));
        assert!(err.is_transient());
    }
}
