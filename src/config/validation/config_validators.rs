//! Configuration section validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for OpenAiConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating OpenAI configuration");

        if self.api_key.is_empty() {
            return Err("OpenAI API key cannot be empty".to_string());
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(format!(
                "OpenAI API base must use http:// or https://, got: {}",
                self.api_base
            ));
        }

        if self.timeout == 0 {
            return Err("OpenAI timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating database configuration");

        if self.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        if self.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for QueueConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating queue configuration");

        if self.name.is_empty() {
            return Err("Queue name cannot be empty".to_string());
        }

        if let Some(url) = &self.url {
            if url.is_empty() {
                return Err("Queue URL cannot be empty when set".to_string());
            }
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(format!("Unsupported queue URL scheme: {}", url));
            }
        }

        Ok(())
    }
}

impl Validate for ReconcileConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating reconcile configuration");

        if self.concurrency == 0 {
            return Err("Reconcile concurrency must be greater than 0".to_string());
        }

        if self.remote_timeout_secs == 0 {
            return Err("Reconcile remote timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.filter.trim().is_empty() {
            return Err("Log filter cannot be empty".to_string());
        }
        Ok(())
    }
}
