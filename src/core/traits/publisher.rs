//! Message publisher trait

use async_trait::async_trait;

use crate::utils::error::Result;

/// At-least-once queue for outbound update messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish one UTF-8 JSON message body to `queue`
    async fn publish(&self, queue: &str, body: &str) -> Result<()>;
}
