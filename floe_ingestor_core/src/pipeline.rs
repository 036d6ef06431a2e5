//! The shared ensure-connection → batch → insert sequence.
//!
//! Both trigger adapters drive this pipeline; only their failure
//! surfacing differs.

use std::collections::HashMap;
use std::sync::Arc;

use floe_snowpipe::{ConnectionConfig, IngestService};
use snafu::ResultExt;

use crate::batch::RowBatch;
use crate::client::ChannelHandle;
use crate::error::{ConfigSnafu, Result};
use crate::insert::{InsertOutcome, insert_batch};

/// One message the stream path could not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMessage {
    /// Index of the message within the invocation.
    pub index: usize,
    pub message: String,
}

/// Outcome of a multi-message invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
    /// The insert outcome, absent when no well-formed rows remained.
    pub outcome: Option<InsertOutcome>,
    /// Messages skipped because they were not valid JSON.
    pub malformed: Vec<MalformedMessage>,
}

pub struct IngestPipeline {
    handle: ChannelHandle,
    variant_column: String,
}

impl IngestPipeline {
    pub fn new(service: Arc<dyn IngestService>, config: ConnectionConfig) -> Self {
        let variant_column = config.variant_column.clone();
        Self {
            handle: ChannelHandle::new(service, config),
            variant_column,
        }
    }

    /// Validate a flat map of configuration values and build the
    /// pipeline from it.
    ///
    /// For callers that defer validation to first use; configuration
    /// problems surface as [`crate::IngestorError::Config`].
    pub fn from_values(
        service: Arc<dyn IngestService>,
        values: &HashMap<String, String>,
    ) -> Result<Self> {
        let config = ConnectionConfig::from_map(values).context(ConfigSnafu {})?;
        Ok(Self::new(service, config))
    }

    pub fn handle(&self) -> &ChannelHandle {
        &self.handle
    }

    pub fn variant_column(&self) -> &str {
        &self.variant_column
    }

    /// Ingest a single payload (the HTTP path).
    ///
    /// Malformed JSON fails the whole invocation. A well-formed
    /// payload with no rows (an empty array) is a no-op: empty
    /// batches are never submitted.
    pub async fn ingest_message(&self, raw: &str) -> Result<InsertOutcome> {
        let mut batch = RowBatch::new();
        batch.push_payload(raw, &self.variant_column)?;

        if batch.is_empty() {
            return Ok(InsertOutcome::Success { rows: 0 });
        }

        let channel = self.handle.ensure_ready().await?;
        insert_batch(channel.as_ref(), &batch).await
    }

    /// Ingest an invocation's worth of messages (the stream path).
    ///
    /// Each message is parsed independently: a malformed message is
    /// recorded in the report and skipped without poisoning the rest.
    /// All surviving rows form one batch submitted in a single insert
    /// call. When nothing survives, no insert call is made.
    pub async fn ingest_messages(&self, messages: &[String]) -> Result<StreamReport> {
        let mut batch = RowBatch::new();
        let mut malformed = Vec::new();

        for (index, raw) in messages.iter().enumerate() {
            if let Err(error) = batch.push_payload(raw, &self.variant_column) {
                tracing::warn!(message_index = index, %error, "skipping malformed message");
                malformed.push(MalformedMessage {
                    index,
                    message: error.to_string(),
                });
            }
        }

        if batch.is_empty() {
            return Ok(StreamReport {
                outcome: None,
                malformed,
            });
        }

        let channel = self.handle.ensure_ready().await?;
        let outcome = insert_batch(channel.as_ref(), &batch).await?;

        Ok(StreamReport {
            outcome: Some(outcome),
            malformed,
        })
    }
}
