//! Batch reconciliation
//!
//! Polls outstanding batch jobs, fans completed results out as update
//! messages, and moves word query bookkeeping from the active to the
//! completed table.

pub mod engine;
mod grouping;
mod parser;
mod report;
mod types;


// Re-export all public types
pub use engine::{EngineConfig, ReconciliationEngine};
pub use grouping::group_by_batch;
pub use parser::{FailedRequest, ParsedOutput, parse_batch_output};
pub use report::{
    BatchOutcome, BatchReport, FailureStage, FanoutReport, PassReport, PassSummary,
    RecordFailure, SkipReason,
};
pub use types::{
    ActiveScan, BatchResult, CompletedWordQueryRecord, OutputFile, QueryStatus, RemoteBatch,
    RemoteBatchStatus, UndecodableRecord, UpdateMessage, WordQueryRecord,
};
