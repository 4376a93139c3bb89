//! Services module
//!
//! Outbound integrations used by the reconciler binary.

pub mod queue;

pub use queue::{InMemoryPublisher, LogPublisher, build_publisher};
#[cfg(feature = "redis")]
pub use queue::RedisQueuePublisher;
