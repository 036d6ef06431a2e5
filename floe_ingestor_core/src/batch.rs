//! Payload-to-row normalization and batch construction.

use floe_snowpipe::Row;
use serde_json::Value;
use snafu::ResultExt;

use crate::error::{PayloadSnafu, Result};

/// Convert one raw payload into its ordered row sequence.
///
/// A JSON array yields one row per element, in array order; any other
/// JSON value (object, scalar, null) yields exactly one row wrapping
/// the whole value. Each row's value is the re-serialized JSON text of
/// the element, which may normalize whitespace and object-key order
/// relative to the raw input.
pub fn rows_from_payload(raw: &str, column: &str) -> Result<Vec<Row>> {
    let value: Value = serde_json::from_str(raw).context(PayloadSnafu {})?;

    let rows = match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| Row::new(column, item.to_string()))
            .collect(),
        other => vec![Row::new(column, other.to_string())],
    };

    Ok(rows)
}

/// An ordered row sequence built from one invocation's message(s).
///
/// Rows are appended in message-arrival order, then in-message array
/// order. Batches are never persisted; they live for the duration of
/// one insert call.
#[derive(Debug, Default)]
pub struct RowBatch {
    rows: Vec<Row>,
}

impl RowBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message's rows. Returns the number of rows added.
    pub fn push_payload(&mut self, raw: &str, column: &str) -> Result<usize> {
        let rows = rows_from_payload(raw, column)?;
        let added = rows.len();
        self.rows.extend(rows);
        Ok(added)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
