//! In-memory publisher

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::core::traits::MessagePublisher;
use crate::utils::error::{ReconcileError, Result};

/// Collects published messages. Messages whose `word` field is in the
/// failing set are rejected instead.
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    messages: RwLock<Vec<(String, String)>>,
    failing_words: RwLock<HashSet<String>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every message for `word` until [`Self::recover`] is called
    pub async fn fail_word(&self, word: impl Into<String>) {
        self.failing_words.write().await.insert(word.into());
    }

    /// Stop rejecting messages
    pub async fn recover(&self) {
        self.failing_words.write().await.clear();
    }

    /// Published `(queue, body)` pairs in publish order
    pub async fn messages(&self) -> Vec<(String, String)> {
        self.messages.read().await.clone()
    }

    /// Words of all published messages, in publish order
    pub async fn published_words(&self) -> Vec<String> {
        self.messages
            .read()
            .await
            .iter()
            .filter_map(|(_, body)| word_of(body))
            .collect()
    }
}

fn word_of(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("word")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl MessagePublisher for InMemoryPublisher {
    async fn publish(&self, queue: &str, body: &str) -> Result<()> {
        if let Some(word) = word_of(body) {
            if self.failing_words.read().await.contains(&word) {
                return Err(ReconcileError::Publish(format!(
                    "queue {} rejected update for '{}'",
                    queue, word
                )));
            }
        }

        self.messages
            .write()
            .await
            .push((queue.to_string(), body.to_string()));
        Ok(())
    }
}
