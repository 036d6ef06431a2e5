//! HTTP ingestor server.
//!
//! This crate provides the synchronous HTTP front door for the
//! ingestion pipeline: a `/v1/ingest` endpoint that accepts one JSON
//! payload per request and forwards it as a single row batch.

pub mod ingest;
pub mod types;

pub use types::{ErrorResponse, IngestResponse, IngestStatus, RowFailure};

use std::sync::Arc;

use axum::{Router, routing::post};
use floe_ingestor_core::IngestPipeline;

use crate::ingest::ingest_handler;

/// HTTP ingestor that receives JSON payloads via POST requests.
pub struct HttpIngestor {
    state: HttpIngestorState,
}

#[derive(Clone)]
pub struct HttpIngestorState {
    pipeline: Arc<IngestPipeline>,
}

impl HttpIngestorState {
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.pipeline
    }
}

impl HttpIngestor {
    pub fn new(pipeline: Arc<IngestPipeline>) -> Self {
        Self {
            state: HttpIngestorState { pipeline },
        }
    }

    pub fn into_router(self) -> Router {
        Router::new()
            .route("/v1/ingest", post(ingest_handler))
            .with_state(self.state)
    }
}
