//! Client-side definitions for a streaming ingest service.
//!
//! This crate provides the validated connection configuration, the
//! [`IngestService`]/[`IngestChannel`] traits describing the remote
//! service, a REST implementation over HTTPS, and an in-memory
//! implementation used by tests.

pub mod config;
pub mod memory;
pub mod rest;
pub mod service;

pub use config::{ConfigError, ConnectionConfig, TableIdent};
pub use memory::{InMemoryIngestService, RecordedInsert};
pub use rest::RestIngestService;
pub use service::{
    IngestChannel, IngestService, InsertFailure, InsertReport, OnErrorOption, OpenChannelRequest,
    Row, ServiceError,
};
