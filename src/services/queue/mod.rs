//! Update queue publishers

mod log;
mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use log::LogPublisher;
pub use memory::InMemoryPublisher;
#[cfg(feature = "redis")]
pub use self::redis::RedisQueuePublisher;

use crate::config::QueueConfig;
use crate::core::traits::MessagePublisher;
use crate::utils::error::Result;
use std::sync::Arc;

/// Build the publisher named by the queue configuration.
///
/// Without a queue URL, messages are written to the log and nowhere else.
pub async fn build_publisher(config: &QueueConfig) -> Result<Arc<dyn MessagePublisher>> {
    match &config.url {
        None => Ok(Arc::new(LogPublisher)),
        #[cfg(feature = "redis")]
        Some(url) => Ok(Arc::new(RedisQueuePublisher::connect(url).await?)),
        #[cfg(not(feature = "redis"))]
        Some(_) => Err(crate::utils::error::ReconcileError::Config(
            "Queue URL configured but the redis feature is disabled".to_string(),
        )),
    }
}
