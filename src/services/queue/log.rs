use async_trait::async_trait;
use tracing::info;

use crate::core::traits::MessagePublisher;
use crate::utils::error::Result;

/// Publisher that only logs each message
#[derive(Debug, Clone, Default)]
pub struct LogPublisher;

#[async_trait]
impl MessagePublisher for LogPublisher {
    async fn publish(&self, queue: &str, body: &str) -> Result<()> {
        info!("Update for {}: {}", queue, body);
        Ok(())
    }
}
