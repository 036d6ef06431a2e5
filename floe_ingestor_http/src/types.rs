//! Request and response types for the HTTP ingest endpoint.

use floe_ingestor_core::InsertOutcome;
use serde::{Deserialize, Serialize};

/// Response payload for a handled ingest request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestResponse {
    pub status: IngestStatus,
    /// Number of rows submitted in the batch.
    pub rows: usize,
    /// Rows the service rejected, empty on full success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RowFailure>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Committed,
    PartialFailure,
}

/// One row the service rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowFailure {
    pub row_index: usize,
    pub message: String,
}

/// Response payload for errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}

impl From<InsertOutcome> for IngestResponse {
    fn from(outcome: InsertOutcome) -> Self {
        match outcome {
            InsertOutcome::Success { rows } => Self {
                status: IngestStatus::Committed,
                rows,
                failures: Vec::new(),
            },
            InsertOutcome::PartialFailure { rows, failures } => Self {
                status: IngestStatus::PartialFailure,
                rows,
                failures: failures
                    .into_iter()
                    .map(|failure| RowFailure {
                        row_index: failure.row_index,
                        message: failure.message,
                    })
                    .collect(),
            },
        }
    }
}
