//! HTTP client for the batch retrieval and file content endpoints

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::core::batch::{OutputFile, RemoteBatch};
use crate::core::traits::BatchJobClient;
use crate::utils::error::{ReconcileError, Result};

/// Batch API client for OpenAI-compatible endpoints
#[derive(Debug, Clone)]
pub struct OpenAiBatchClient {
    client: Client,
    api_base: String,
    api_key: String,
    organization: Option<String>,
}

impl OpenAiBatchClient {
    /// Create a new client
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ReconcileError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            organization: config.organization.clone(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        let mut req = self.client.get(url).bearer_auth(&self.api_key);

        if let Some(org) = &self.organization {
            req = req.header("OpenAI-Organization", org);
        }

        req
    }
}

/// Pull `error.message` out of an OpenAI error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl BatchJobClient for OpenAiBatchClient {
    async fn retrieve(&self, batch_id: &str) -> Result<Option<RemoteBatch>> {
        debug!("Retrieving batch {}", batch_id);
        let response = self.get(&format!("/batches/{}", batch_id)).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReconcileError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let batch = response.json::<RemoteBatch>().await?;
        debug!("Batch {} is {:?}", batch.id, batch.status);
        Ok(Some(batch))
    }

    async fn fetch_output_file(&self, file_id: &str) -> Result<OutputFile> {
        debug!("Fetching output file {}", file_id);
        let response = self.get(&format!("/files/{}/content", file_id)).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(OutputFile { status, body })
    }
}
