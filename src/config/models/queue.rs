//! Update queue configuration

use super::default_queue_name;
use serde::{Deserialize, Serialize};

/// Destination for word update messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue server URL (`redis://...`). Without one, messages are only logged.
    #[serde(default)]
    pub url: Option<String>,
    /// Queue (list key) messages are pushed onto
    #[serde(default = "default_queue_name")]
    pub name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: None,
            name: default_queue_name(),
        }
    }
}
