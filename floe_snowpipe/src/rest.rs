//! REST implementation of the ingest service traits.
//!
//! Wire contract: TLS-only connection to `{account}.snowflakecomputing.com:443`,
//! the table addressed as `database.schema.table`, each row a single-key
//! record `{variantColumn: <json-text>}`, and every batch submission
//! carrying a UUID-format batch tag.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::config::ConnectionConfig;
use crate::service::{
    IngestChannel, IngestService, InsertFailure, InsertReport, OnErrorOption, OpenChannelRequest,
    Result, Row, ServiceError, TransportSnafu,
};

/// HTTPS client for the streaming ingest endpoint.
#[derive(Debug, Clone)]
pub struct RestIngestService {
    client: reqwest::Client,
    base_url: String,
    auth_secret: String,
    user: String,
    warehouse: Option<String>,
    role: Option<String>,
}

impl RestIngestService {
    pub fn new(config: &ConnectionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.ingest_url(),
            auth_secret: config.auth_secret().to_string(),
            user: config.user.clone(),
            warehouse: config.warehouse.clone(),
            role: config.role.clone(),
        }
    }
}

#[derive(Serialize)]
struct OpenChannelBody<'a> {
    database: &'a str,
    schema: &'a str,
    table: &'a str,
    channel: &'a str,
    client: &'a str,
    user: &'a str,
    on_error: OnErrorOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

#[derive(Serialize)]
struct InsertRowsBody<'a> {
    rows: &'a [Row],
    batch_tag: &'a str,
}

#[derive(Deserialize)]
struct InsertRowsResponse {
    #[serde(default)]
    errors: Vec<InsertFailure>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl IngestService for RestIngestService {
    async fn open_channel(&self, request: OpenChannelRequest) -> Result<Arc<dyn IngestChannel>> {
        let url = format!("{}/v1/streaming/channels:open", self.base_url);

        let body = OpenChannelBody {
            database: &request.table.database,
            schema: &request.table.schema,
            table: &request.table.table,
            channel: &request.channel_name,
            client: &request.client_name,
            user: &self.user,
            on_error: request.on_error,
            warehouse: self.warehouse.as_deref(),
            role: self.role.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.auth_secret)
            .json(&body)
            .send()
            .await
            .context(TransportSnafu {})?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let channel = RestChannel {
            client: self.client.clone(),
            insert_url: format!(
                "{}/v1/streaming/channels/{}:insert",
                self.base_url, request.channel_name
            ),
            auth_secret: self.auth_secret.clone(),
            channel_name: request.channel_name,
        };

        Ok(Arc::new(channel))
    }
}

/// An open streaming channel backed by the REST endpoint.
#[derive(Debug)]
pub struct RestChannel {
    client: reqwest::Client,
    insert_url: String,
    auth_secret: String,
    channel_name: String,
}

#[async_trait]
impl IngestChannel for RestChannel {
    fn channel_name(&self) -> &str {
        &self.channel_name
    }

    async fn insert_rows(&self, rows: &[Row], batch_tag: &str) -> Result<InsertReport> {
        let body = InsertRowsBody { rows, batch_tag };

        let response = self
            .client
            .post(&self.insert_url)
            .bearer_auth(&self.auth_secret)
            .json(&body)
            .send()
            .await
            .context(TransportSnafu {})?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let decoded = response
            .json::<InsertRowsResponse>()
            .await
            .context(TransportSnafu {})?;

        Ok(InsertReport {
            failures: decoded.errors,
        })
    }
}

async fn rejection(response: reqwest::Response) -> ServiceError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    ServiceError::Rejected { status, message }
}
