//! Batch reconciliation types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Local status of a word query, mirroring its batch job at the last poll
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Submitted, the job has not started yet
    AwaitingResponse,
    /// The job is running or finalizing
    InProgress,
    /// The job finished and produced an output file
    Completed,
    /// The job failed or expired
    Failed,
    /// The job was cancelled
    Cancelled,
}

impl QueryStatus {
    /// Terminal statuses never change again on the remote side
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingResponse => "awaiting_response",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStatus {
    type Err = String;

    /// Accepts the local names and the batch API's own status names, which
    /// older writers stored verbatim. API names map as in
    /// [`RemoteBatchStatus::to_query_status`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(' ', "_");
        match normalized.as_str() {
            "awaiting_response" | "validating" => Ok(Self::AwaitingResponse),
            "in_progress" | "finalizing" | "cancelling" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" | "expired" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("unknown query status: {}", s)),
        }
    }
}

/// Status reported by the remote batch API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteBatchStatus {
    /// Input file is being validated
    Validating,
    /// Input validation failed
    Failed,
    /// Requests are being processed
    InProgress,
    /// Results are being written
    Finalizing,
    /// Output file is available
    Completed,
    /// The completion window elapsed
    Expired,
    /// Cancellation was requested
    Cancelling,
    /// The job was cancelled
    Cancelled,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl RemoteBatchStatus {
    /// Map the remote status onto the local status set.
    ///
    /// Expired jobs are terminal on the remote side and are recorded as
    /// failed; unknown statuses are treated as still running.
    pub fn to_query_status(&self) -> QueryStatus {
        match self {
            Self::Validating => QueryStatus::AwaitingResponse,
            Self::InProgress | Self::Finalizing | Self::Cancelling | Self::Unknown => {
                QueryStatus::InProgress
            }
            Self::Completed => QueryStatus::Completed,
            Self::Failed | Self::Expired => QueryStatus::Failed,
            Self::Cancelled => QueryStatus::Cancelled,
        }
    }
}

/// Remote batch job as returned by the batch API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBatch {
    /// Batch ID
    pub id: String,
    /// Batch status
    pub status: RemoteBatchStatus,
    /// Output file ID (for completed batches)
    #[serde(default)]
    pub output_file_id: Option<String>,
    /// Error file ID (for failed requests)
    #[serde(default)]
    pub error_file_id: Option<String>,
}

/// Raw output file response
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// HTTP status code of the content request
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl OutputFile {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outstanding word query, stored in the active table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordQueryRecord {
    /// Record ID
    pub id: String,
    /// Word being looked up, unique within its batch
    pub word: String,
    /// Correlation ID of this word inside the batch input file
    pub batch_request_custom_id: String,
    /// Owning batch job
    pub batch_request_id: String,
    /// Input file the request was uploaded in
    pub uploaded_file_id: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
    /// Status at the last poll
    pub status: QueryStatus,
}

impl WordQueryRecord {
    /// Set a new status and advance `updated_at`.
    ///
    /// A terminal status is never replaced by a non-terminal one; returns
    /// whether the record changed.
    pub fn refresh_status(&mut self, status: QueryStatus, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() && !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.updated_at = now;
        true
    }
}

/// Active row that could not be decoded into a [`WordQueryRecord`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UndecodableRecord {
    pub id: String,
    pub reason: String,
}

/// Contents of the active table
#[derive(Debug, Clone, Default)]
pub struct ActiveScan {
    pub records: Vec<WordQueryRecord>,
    /// Rows left out of `records`, reported instead of failing the scan
    pub undecodable: Vec<UndecodableRecord>,
}

impl From<Vec<WordQueryRecord>> for ActiveScan {
    fn from(records: Vec<WordQueryRecord>) -> Self {
        Self {
            records,
            undecodable: Vec::new(),
        }
    }
}

/// Finished word query, stored in the completed table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedWordQueryRecord {
    pub id: String,
    pub word: String,
    pub batch_request_custom_id: String,
    pub batch_request_id: String,
    pub uploaded_file_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: QueryStatus,
    /// When the batch was judged terminal
    pub completed_at: DateTime<Utc>,
}

impl CompletedWordQueryRecord {
    /// Build the completed counterpart of an active record
    pub fn from_active(record: &WordQueryRecord, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            word: record.word.clone(),
            batch_request_custom_id: record.batch_request_custom_id.clone(),
            batch_request_id: record.batch_request_id.clone(),
            uploaded_file_id: record.uploaded_file_id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            status: record.status,
            completed_at,
        }
    }
}

/// One decoded line of a batch output file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchResult {
    pub word: String,
    pub offensiveness: i32,
    pub commonness: i32,
    pub sentiment: i32,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Message sent to the word updater for each resolved word
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateMessage {
    pub word: String,
    pub offensiveness: i32,
    pub commonness: i32,
    pub sentiment: i32,
    pub types: Vec<String>,
}

impl From<BatchResult> for UpdateMessage {
    fn from(result: BatchResult) -> Self {
        Self {
            word: result.word,
            offensiveness: result.offensiveness,
            commonness: result.commonness,
            sentiment: result.sentiment,
            types: result.types,
        }
    }
}
