//! Reconciliation engine
//!
//! Split by concern:
//! - `core`: engine construction and the pass driver
//! - `execution`: per-batch state machine and store commits
//! - `fanout`: output file retrieval and update message publishing

pub mod core;
mod execution;
mod fanout;

pub use self::core::{EngineConfig, ReconciliationEngine};
