//! In-memory implementation of the ingest service traits.
//!
//! This implementation records every channel open and row insert and is
//! suitable for testing and development. Failures can be injected to
//! exercise the error paths of callers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::service::{
    IngestChannel, IngestService, InsertFailure, InsertReport, OpenChannelRequest, Result, Row,
    ServiceError,
};

/// One recorded insert call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInsert {
    pub batch_tag: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
struct Inner {
    opened: Vec<OpenChannelRequest>,
    inserts: Vec<RecordedInsert>,
    open_failure: Option<String>,
    insert_failures: Option<Vec<InsertFailure>>,
    insert_transport_failure: bool,
}

/// Ingest service that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIngestService {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryIngestService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of channels opened so far.
    pub fn open_channel_count(&self) -> usize {
        self.inner.lock().unwrap().opened.len()
    }

    /// The open-channel requests received, in order.
    pub fn opened_requests(&self) -> Vec<OpenChannelRequest> {
        self.inner.lock().unwrap().opened.clone()
    }

    /// The insert calls received, in order.
    pub fn recorded_inserts(&self) -> Vec<RecordedInsert> {
        self.inner.lock().unwrap().inserts.clone()
    }

    /// Make the next open-channel call fail with the given message.
    pub fn inject_open_failure(&self, message: impl Into<String>) {
        self.inner.lock().unwrap().open_failure = Some(message.into());
    }

    /// Make the next insert call report the given row failures.
    pub fn inject_row_failures(&self, failures: Vec<InsertFailure>) {
        self.inner.lock().unwrap().insert_failures = Some(failures);
    }

    /// Make the next insert call fail at the transport level.
    pub fn inject_insert_transport_failure(&self) {
        self.inner.lock().unwrap().insert_transport_failure = true;
    }
}

#[async_trait]
impl IngestService for InMemoryIngestService {
    async fn open_channel(&self, request: OpenChannelRequest) -> Result<Arc<dyn IngestChannel>> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(message) = inner.open_failure.take() {
            return Err(ServiceError::Rejected {
                status: StatusCode::UNAUTHORIZED,
                message,
            });
        }

        let channel_name = request.channel_name.clone();
        inner.opened.push(request);

        Ok(Arc::new(InMemoryChannel {
            channel_name,
            inner: self.inner.clone(),
        }))
    }
}

/// Channel handed out by [`InMemoryIngestService`].
///
/// All channels share the service state, so inserts remain observable
/// through the service regardless of which channel received them.
#[derive(Debug)]
pub struct InMemoryChannel {
    channel_name: String,
    inner: Arc<Mutex<Inner>>,
}

#[async_trait]
impl IngestChannel for InMemoryChannel {
    fn channel_name(&self) -> &str {
        &self.channel_name
    }

    async fn insert_rows(&self, rows: &[Row], batch_tag: &str) -> Result<InsertReport> {
        let mut inner = self.inner.lock().unwrap();

        if std::mem::take(&mut inner.insert_transport_failure) {
            return Err(ServiceError::ChannelClosed);
        }

        inner.inserts.push(RecordedInsert {
            batch_tag: batch_tag.to_string(),
            rows: rows.to_vec(),
        });

        let failures = inner.insert_failures.take().unwrap_or_default();
        Ok(InsertReport { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableIdent;
    use crate::service::OnErrorOption;

    fn open_request() -> OpenChannelRequest {
        OpenChannelRequest {
            table: TableIdent::parse("db.schema.events").unwrap(),
            channel_name: "test-channel".to_string(),
            client_name: "test-client".to_string(),
            on_error: OnErrorOption::Continue,
        }
    }

    #[tokio::test]
    async fn test_records_opens_and_inserts() {
        let service = InMemoryIngestService::new();
        let channel = service.open_channel(open_request()).await.unwrap();

        let rows = vec![Row::new("jsonValue", "{}")];
        let report = channel.insert_rows(&rows, "tag-1").await.unwrap();

        assert!(!report.has_failures());
        assert_eq!(service.open_channel_count(), 1);

        let inserts = service.recorded_inserts();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].batch_tag, "tag-1");
        assert_eq!(inserts[0].rows, rows);
    }

    #[tokio::test]
    async fn test_injected_failures_fire_once() {
        let service = InMemoryIngestService::new();
        let channel = service.open_channel(open_request()).await.unwrap();

        service.inject_row_failures(vec![InsertFailure {
            row_index: 0,
            message: "invalid".to_string(),
        }]);

        let rows = vec![Row::new("jsonValue", "{}")];
        let report = channel.insert_rows(&rows, "tag-1").await.unwrap();
        assert!(report.has_failures());

        let report = channel.insert_rows(&rows, "tag-2").await.unwrap();
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_injected_open_failure() {
        let service = InMemoryIngestService::new();
        service.inject_open_failure("bad credentials");

        let error = service.open_channel(open_request()).await.err().unwrap();
        assert!(matches!(error, ServiceError::Rejected { .. }));
        assert_eq!(service.open_channel_count(), 0);
    }
}
