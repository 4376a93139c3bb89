//! OpenAI batch API configuration

use super::{default_api_base, default_timeout};
use serde::{Deserialize, Serialize};

/// Credentials and endpoint for the batch and file APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// API base URL, without a trailing slash
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Organization ID (optional)
    #[serde(default)]
    pub organization: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            organization: None,
            timeout: default_timeout(),
        }
    }
}
