//! Message-stream ingestor.
//!
//! This crate provides the event-stream front door for the ingestion
//! pipeline: each chunk of messages delivered by the source is one
//! invocation. Failures are logged and never propagated — the hosting
//! source's redelivery semantics, if any, are the only retry policy.

use std::pin::pin;
use std::sync::Arc;

use floe_ingestor_core::{IngestPipeline, InsertOutcome};
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Stream ingestor that forwards message chunks to the pipeline.
pub struct StreamIngestor {
    pipeline: Arc<IngestPipeline>,
}

impl StreamIngestor {
    pub fn new(pipeline: Arc<IngestPipeline>) -> Self {
        Self { pipeline }
    }

    /// Consume the stream until it ends or the token is cancelled.
    ///
    /// Each item is processed to completion; cancellation takes effect
    /// between chunks.
    pub async fn run<S>(self, stream: S, ct: CancellationToken)
    where
        S: Stream<Item = Vec<String>>,
    {
        let mut stream = pin!(stream);

        loop {
            tokio::select! {
                biased;
                _ = ct.cancelled() => break,
                chunk = stream.next() => {
                    let Some(messages) = chunk else {
                        break;
                    };

                    self.process_invocation(&messages).await;
                }
            }
        }
    }

    /// Handle one invocation's worth of messages.
    ///
    /// Every outcome is considered handled: malformed messages and
    /// partial failures are reported inside the pipeline, hard
    /// failures become a warning here. Messages are never re-queued
    /// locally.
    pub async fn process_invocation(&self, messages: &[String]) {
        tracing::info!(messages = messages.len(), "stream trigger received messages");

        match self.pipeline.ingest_messages(messages).await {
            Ok(report) => match report.outcome {
                Some(InsertOutcome::Success { rows }) => {
                    tracing::info!(rows, skipped = report.malformed.len(), "batch committed");
                }
                Some(InsertOutcome::PartialFailure { rows, ref failures }) => {
                    tracing::info!(
                        rows,
                        failed_rows = failures.len(),
                        skipped = report.malformed.len(),
                        "batch committed with rejected rows"
                    );
                }
                None => {
                    tracing::debug!(
                        skipped = report.malformed.len(),
                        "no well-formed rows to forward"
                    );
                }
            },
            Err(error) => {
                tracing::warn!(%error, "failed to forward messages");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use floe_snowpipe::{ConnectionConfig, InMemoryIngestService, config::keys};
    use futures::stream;

    use super::*;

    fn create_ingestor() -> (InMemoryIngestService, StreamIngestor) {
        let values: HashMap<String, String> = [
            (keys::ACCOUNT, "test-account"),
            (keys::USER, "test_user"),
            (keys::PASSWORD, "test-password"),
            (keys::DB_SCHEMA_TABLE, "analytics.events.raw"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let config = ConnectionConfig::from_map(&values).expect("test config");

        let service = InMemoryIngestService::new();
        let pipeline = Arc::new(IngestPipeline::new(Arc::new(service.clone()), config));

        (service, StreamIngestor::new(pipeline))
    }

    #[tokio::test]
    async fn test_each_chunk_is_one_invocation() {
        let (service, ingestor) = create_ingestor();

        let chunks = stream::iter(vec![
            vec![r#"[{"a":1},{"a":2}]"#.to_string()],
            vec![r#"{"b":1}"#.to_string(), r#"{"b":2}"#.to_string()],
        ]);

        ingestor.run(chunks, CancellationToken::new()).await;

        let inserts = service.recorded_inserts();
        assert_eq!(inserts.len(), 2);
        assert_eq!(inserts[0].rows.len(), 2);
        assert_eq!(inserts[1].rows.len(), 2);
        assert_eq!(service.open_channel_count(), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_consumption() {
        let (service, ingestor) = create_ingestor();
        service.inject_open_failure("bad credentials");

        let chunks = stream::iter(vec![
            vec![r#"{"a":1}"#.to_string()],
            vec![r#"{"a":2}"#.to_string()],
        ]);

        // First chunk hits the injected failure and is dropped; the
        // second chunk retries initialization and lands.
        ingestor.run(chunks, CancellationToken::new()).await;

        let inserts = service.recorded_inserts();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].rows[0].json_text(), r#"{"a":2}"#);
    }

    #[tokio::test]
    async fn test_malformed_messages_are_skipped() {
        let (service, ingestor) = create_ingestor();

        let chunks = stream::iter(vec![vec![
            r#"{"a":1}"#.to_string(),
            "{broken".to_string(),
        ]]);

        ingestor.run(chunks, CancellationToken::new()).await;

        let inserts = service.recorded_inserts();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].rows.len(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let (service, ingestor) = create_ingestor();

        let ct = CancellationToken::new();
        ct.cancel();

        let chunks = stream::iter(vec![vec![r#"{"a":1}"#.to_string()]]);
        ingestor.run(chunks, ct).await;

        assert!(service.recorded_inserts().is_empty());
    }
}
