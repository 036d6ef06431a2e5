//! Batch submission and partial-failure interpretation.

use floe_snowpipe::{IngestChannel, InsertFailure};
use snafu::ResultExt;
use uuid::Uuid;

use crate::batch::RowBatch;
use crate::error::{InsertSnafu, Result};

/// Outcome of one insert call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Every row was committed.
    Success { rows: usize },
    /// The service rejected some rows; the rest were committed.
    ///
    /// Non-fatal: the batch is not retried, since the channel's
    /// on-error policy already chose to continue row-wise.
    PartialFailure {
        rows: usize,
        failures: Vec<InsertFailure>,
    },
}

impl InsertOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InsertOutcome::Success { .. })
    }

    /// Total number of rows submitted.
    pub fn rows(&self) -> usize {
        match self {
            InsertOutcome::Success { rows } => *rows,
            InsertOutcome::PartialFailure { rows, .. } => *rows,
        }
    }

    pub fn failures(&self) -> &[InsertFailure] {
        match self {
            InsertOutcome::Success { .. } => &[],
            InsertOutcome::PartialFailure { failures, .. } => failures,
        }
    }
}

/// Submit the batch under a freshly generated batch tag.
///
/// The tag is random per submission and used only for the remote call
/// and for tracing; it is never compared or stored locally.
pub async fn insert_batch(channel: &dyn IngestChannel, batch: &RowBatch) -> Result<InsertOutcome> {
    let batch_tag = Uuid::new_v4().to_string();

    tracing::info!(%batch_tag, rows = batch.len(), "submitting row batch");

    let report = channel
        .insert_rows(batch.rows(), &batch_tag)
        .await
        .context(InsertSnafu {
            message: "failed to submit row batch",
        })?;

    if report.has_failures() {
        let first = &report.failures[0];
        tracing::warn!(
            %batch_tag,
            failed_rows = report.failures.len(),
            first_row = first.row_index,
            first_cause = %first.message,
            "service rejected some rows"
        );

        return Ok(InsertOutcome::PartialFailure {
            rows: batch.len(),
            failures: report.failures,
        });
    }

    Ok(InsertOutcome::Success { rows: batch.len() })
}
