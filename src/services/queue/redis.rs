//! Redis list publisher

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

use crate::core::traits::MessagePublisher;
use crate::utils::error::{ReconcileError, Result};

/// Pushes each message onto the tail of a Redis list named after the queue
#[derive(Clone)]
pub struct RedisQueuePublisher {
    connection: MultiplexedConnection,
}

impl std::fmt::Debug for RedisQueuePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueuePublisher").finish_non_exhaustive()
    }
}

impl RedisQueuePublisher {
    /// Connect to the queue server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to update queue");
        debug!("Queue URL: {}", sanitize_url(url));

        let client = Client::open(url).map_err(ReconcileError::Redis)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(ReconcileError::Redis)?;

        info!("Update queue connection established");
        Ok(Self { connection })
    }
}

/// Hide credentials in a connection URL for logging
fn sanitize_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[async_trait]
impl MessagePublisher for RedisQueuePublisher {
    async fn publish(&self, queue: &str, body: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.rpush(queue, body).await.map_err(ReconcileError::Redis)?;
        Ok(())
    }
}
