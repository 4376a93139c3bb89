//! Error handling for the reconciler
//!
//! This module defines the error types shared by the engine and its adapters.

use thiserror::Error;

/// Result type alias for the reconciler
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Main error type for the reconciler
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network errors
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from a remote API
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Record store errors not covered by a driver error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Queue publishing errors
    #[error("Publish error: {0}")]
    Publish(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReconcileError {
    /// Whether a retry on the next pass has a reasonable chance of succeeding.
    ///
    /// Rate limits and server-side failures are transient; authentication and
    /// malformed-request responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::HttpClient(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised while turning a completed batch into update messages.
#[derive(Error, Debug)]
pub enum FanoutError {
    /// The job reports success but exposes no output artifact
    #[error("Batch {batch_id} completed without an output file")]
    MissingOutputFile { batch_id: String },

    /// The output file could not be fetched
    #[error("Failed to fetch output file {file_id}: {source}")]
    OutputFetch {
        file_id: String,
        #[source]
        source: ReconcileError,
    },

    /// The output file request returned a non-success status
    #[error("Output file {file_id} returned status {status}")]
    OutputStatus { file_id: String, status: u16 },

    /// A result line could not be decoded
    #[error("Malformed result on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl FanoutError {
    /// Retriable conditions leave the batch for the next pass; fatal ones
    /// need an operator or an upstream fix.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::OutputFetch { .. } | Self::OutputStatus { .. })
    }
}
