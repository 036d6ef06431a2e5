//! Core ingestion pipeline.
//!
//! Raw JSON message(s) are normalized into variant-column rows, batched
//! per invocation, and submitted over one lazily-opened streaming
//! channel. Both trigger adapters (HTTP and message stream) drive the
//! same [`IngestPipeline`].

pub mod batch;
pub mod client;
pub mod error;
pub mod insert;
pub mod pipeline;

pub use batch::{RowBatch, rows_from_payload};
pub use client::ChannelHandle;
pub use error::{IngestorError, Result};
pub use insert::{InsertOutcome, insert_batch};
pub use pipeline::{IngestPipeline, MalformedMessage, StreamReport};
