use std::{net::SocketAddr, sync::Arc};

use clap::Args;
use floe_ingestor_core::IngestPipeline;
use floe_ingestor_http::HttpIngestor;
use floe_snowpipe::{ConnectionConfig, RestIngestService};
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::error::{ConfigSnafu, InvalidServerAddressSnafu, IoSnafu, Result};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// The address of the HTTP ingestor server.
    #[arg(long, default_value = "127.0.0.1:7780")]
    address: String,
}

impl ServeArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let address = self
            .address
            .parse::<SocketAddr>()
            .context(InvalidServerAddressSnafu {})?;

        let config = ConnectionConfig::from_env().context(ConfigSnafu {})?;

        println!("Starting floe HTTP ingestor");
        println!("Target table: {}", config.table);
        println!("HTTP ingestor listening on {}", address);

        let service = Arc::new(RestIngestService::new(&config));
        let pipeline = Arc::new(IngestPipeline::new(service, config));

        let app = HttpIngestor::new(pipeline).into_router();

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .context(IoSnafu {})?;

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            ct.cancelled().await;
        });

        server.await.context(IoSnafu {})
    }
}
