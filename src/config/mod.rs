//! Configuration management for the reconciler
//!
//! Configuration is read from a YAML file, then overridden by environment
//! variables, then validated.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::core::batch::EngineConfig;
use crate::utils::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Main configuration struct for the reconciler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batch API endpoint and credentials
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Record store
    #[serde(default, alias = "storage")]
    pub database: DatabaseConfig,
    /// Update queue
    #[serde(default)]
    pub queue: QueueConfig,
    /// Pass tuning
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file. Environment overrides are not applied.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReconcileError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ReconcileError::Config(format!("Failed to parse config: {}", e)))?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Self {
        info!("Loading configuration from environment variables");
        let mut config = Self::default();
        config.merge_env();
        config
    }

    /// Override fields from the process environment
    pub fn merge_env(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`, which maps a variable name to its value
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = v;
        }
        if let Some(v) = get("OPENAI_API_BASE") {
            self.openai.api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("OPENAI_ORGANIZATION") {
            self.openai.organization = Some(v);
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = get("UPDATE_QUEUE_URL") {
            self.queue.url = Some(v);
        }
        if let Some(v) = get("UPDATE_QUEUE_NAME") {
            self.queue.name = v;
        }
        if let Some(v) = get("RECONCILE_CONCURRENCY") {
            match v.parse() {
                Ok(n) => self.reconcile.concurrency = n,
                Err(_) => warn!("Ignoring invalid RECONCILE_CONCURRENCY: {}", v),
            }
        }
        if let Some(v) = get("RECONCILE_REMOTE_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.reconcile.remote_timeout_secs = n,
                Err(_) => warn!("Ignoring invalid RECONCILE_REMOTE_TIMEOUT_SECS: {}", v),
            }
        }
        if let Some(v) = get("RECONCILE_NOT_FOUND_CEILING_HOURS") {
            match v.parse() {
                Ok(n) => self.reconcile.not_found_ceiling_hours = n,
                Err(_) => warn!("Ignoring invalid RECONCILE_NOT_FOUND_CEILING_HOURS: {}", v),
            }
        }
        if let Some(v) = get("LOG_JSON") {
            self.logging.json = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.openai
            .validate()
            .map_err(|e| ReconcileError::Config(format!("OpenAI config error: {}", e)))?;
        self.database
            .validate()
            .map_err(|e| ReconcileError::Config(format!("Database config error: {}", e)))?;
        self.queue
            .validate()
            .map_err(|e| ReconcileError::Config(format!("Queue config error: {}", e)))?;
        self.reconcile
            .validate()
            .map_err(|e| ReconcileError::Config(format!("Reconcile config error: {}", e)))?;
        self.logging
            .validate()
            .map_err(|e| ReconcileError::Config(format!("Logging config error: {}", e)))?;

        if self.queue.url.is_none() {
            warn!("No update queue URL configured, update messages will only be logged");
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        let ceiling = match self.reconcile.not_found_ceiling_hours {
            0 => None,
            hours => Some(Duration::from_secs(hours * 3600)),
        };

        EngineConfig::new(self.queue.name.clone())
            .with_concurrency(self.reconcile.concurrency)
            .with_remote_timeout(Duration::from_secs(self.reconcile.remote_timeout_secs))
            .with_not_found_ceiling(ceiling)
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ReconcileError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
