//! Core functionality for the reconciler
//!
//! The reconciliation engine, the collaborator traits it is wired through,
//! and the batch API adapter.

pub mod batch;
pub mod providers;
pub mod traits;
