//! Lazy, process-wide channel lifecycle.

use std::sync::Arc;

use floe_snowpipe::{
    ConnectionConfig, IngestChannel, IngestService, OnErrorOption, OpenChannelRequest,
};
use snafu::ResultExt;
use tokio::sync::Mutex;

use crate::error::{ConnectionSnafu, Result};

/// Owns the single channel opened against the configured table.
///
/// The channel is created lazily on first use and reused for the rest
/// of the process lifetime. Configuration changes after the first
/// successful call are not applied. The handle is shared by cloning the
/// surrounding `Arc`; it is never stored in a static.
pub struct ChannelHandle {
    service: Arc<dyn IngestService>,
    config: ConnectionConfig,
    channel: Mutex<Option<Arc<dyn IngestChannel>>>,
}

impl ChannelHandle {
    pub fn new(service: Arc<dyn IngestService>, config: ConnectionConfig) -> Self {
        Self {
            service,
            config,
            channel: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Return the open channel, opening it on first use.
    ///
    /// Safe to call on every invocation. The check-and-create sequence
    /// runs under one lock, so concurrent first callers wait for and
    /// reuse the winner's channel instead of racing to open a second
    /// one. A failed open leaves the slot empty, so a later call
    /// retries from scratch.
    pub async fn ensure_ready(&self) -> Result<Arc<dyn IngestChannel>> {
        let mut slot = self.channel.lock().await;

        if let Some(channel) = slot.as_ref() {
            return Ok(channel.clone());
        }

        let request = OpenChannelRequest {
            table: self.config.table.clone(),
            channel_name: self.config.channel_name.clone(),
            client_name: self.config.client_name.clone(),
            on_error: OnErrorOption::Continue,
        };

        let channel = self
            .service
            .open_channel(request)
            .await
            .context(ConnectionSnafu {
                message: "failed to open ingest channel",
            })?;

        tracing::info!(
            channel = %channel.channel_name(),
            table = %self.config.table,
            "ingest channel opened"
        );

        *slot = Some(channel.clone());
        Ok(channel)
    }

    /// Drop the cached channel so the next call re-initializes.
    ///
    /// Never called in normal operation; process exit reclaims the
    /// channel.
    pub async fn reset(&self) {
        *self.channel.lock().await = None;
    }
}
