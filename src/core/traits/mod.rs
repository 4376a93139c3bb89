//! Core traits module
//!
//! The collaborator seams of the reconciliation engine. Every remote or
//! persistent dependency is injected through one of these traits.

pub mod batch_client;
pub mod follow_up;
pub mod publisher;
pub mod record_store;

pub use batch_client::BatchJobClient;
pub use follow_up::{MissingWordHandler, ReportOnly};
pub use publisher::MessagePublisher;
pub use record_store::RecordStore;
