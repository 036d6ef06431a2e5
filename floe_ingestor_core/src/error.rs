//! Ingestor error types.
//!
//! The message associated with an error is forwarded to the caller,
//! for this reason it should contain information that is useful to the
//! user.

use floe_snowpipe::{ConfigError, ServiceError};
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestorError {
    /// Configuration rejected before any connection attempt.
    ///
    /// Not retryable without an operator fix.
    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },
    /// Client or channel setup failed.
    ///
    /// Fatal for the invocation; nothing is cached, so the next
    /// invocation retries initialization from scratch.
    #[snafu(display("connection error: {message}"))]
    Connection {
        message: &'static str,
        source: ServiceError,
    },
    /// The payload is not valid JSON.
    ///
    /// Fatal for that message only.
    #[snafu(display("malformed JSON payload: {source}"))]
    Payload { source: serde_json::Error },
    /// The batch submission failed at the transport level.
    ///
    /// Fatal for the whole batch; no partial-success assumption is
    /// possible at this layer.
    #[snafu(display("insert error: {message}"))]
    Insert {
        message: &'static str,
        source: ServiceError,
    },
}

pub type Result<T, E = IngestorError> = std::result::Result<T, E>;
