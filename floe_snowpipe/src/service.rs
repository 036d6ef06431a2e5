//! Service traits and exchange types for streaming ingestion.
//!
//! The remote service exposes two operations: opening a long-lived
//! channel bound to one table, and submitting ordered row batches over
//! that channel. Implementations live in [`crate::rest`] (HTTPS) and
//! [`crate::memory`] (tests).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use snafu::Snafu;

use crate::config::TableIdent;

/// Errors returned by ingest service implementations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ServiceError {
    /// The request never produced a response.
    #[snafu(display("transport error"))]
    Transport { source: reqwest::Error },
    /// The service answered with a non-success status.
    #[snafu(display("service rejected request: status={status}, message={message}"))]
    Rejected { status: StatusCode, message: String },
    /// The channel is no longer usable.
    #[snafu(display("channel closed"))]
    ChannelClosed,
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// A single row destined for the variant column.
///
/// Rows are immutable once constructed and serialize as a single-key
/// record `{<column>: <json-text>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    column: String,
    value: String,
}

impl Row {
    /// Create a row wrapping one logical record's JSON text.
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// The serialized JSON text of the wrapped record.
    pub fn json_text(&self) -> &str {
        &self.value
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.column, &self.value)?;
        map.end()
    }
}

/// Row-level error policy applied by the service while validating a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnErrorOption {
    /// Validate rows independently; rejected rows do not abort the batch.
    Continue,
    /// Abort the whole batch on the first invalid row.
    Abort,
}

/// Request to open a streaming channel against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenChannelRequest {
    pub table: TableIdent,
    pub channel_name: String,
    pub client_name: String,
    pub on_error: OnErrorOption,
}

/// One row the service rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertFailure {
    /// Index of the row within the submitted batch.
    pub row_index: usize,
    /// The cause reported by the service.
    pub message: String,
}

/// Per-row validation outcome of one insert call.
///
/// Rows not listed in `failures` were committed by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub failures: Vec<InsertFailure>,
}

impl InsertReport {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A connection to the remote ingest service.
#[async_trait]
pub trait IngestService: Send + Sync {
    /// Open a streaming channel bound to the requested table.
    async fn open_channel(&self, request: OpenChannelRequest) -> Result<Arc<dyn IngestChannel>>;
}

/// A long-lived channel through which row batches are submitted.
///
/// Channels are safe for concurrent use; the service validates rows
/// according to the [`OnErrorOption`] chosen at open time.
#[async_trait]
pub trait IngestChannel: Send + Sync {
    fn channel_name(&self) -> &str;

    /// Submit the full ordered row sequence under one batch tag.
    async fn insert_rows(&self, rows: &[Row], batch_tag: &str) -> Result<InsertReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_serializes_as_single_key_record() {
        let row = Row::new("jsonValue", r#"{"a":1}"#);
        let encoded = serde_json::to_string(&row).unwrap();
        assert_eq!(encoded, r#"{"jsonValue":"{\"a\":1}"}"#);
    }

    #[test]
    fn test_on_error_wire_format() {
        assert_eq!(
            serde_json::to_string(&OnErrorOption::Continue).unwrap(),
            r#""CONTINUE""#
        );
        assert_eq!(
            serde_json::to_string(&OnErrorOption::Abort).unwrap(),
            r#""ABORT""#
        );
    }
}
