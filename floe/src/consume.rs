use std::sync::Arc;

use clap::Args;
use floe_ingestor_core::IngestPipeline;
use floe_ingestor_stream::StreamIngestor;
use floe_snowpipe::{ConnectionConfig, RestIngestService};
use futures::{StreamExt, future, stream};
use snafu::ResultExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::error::{ConfigSnafu, Result};

#[derive(Debug, Args)]
pub struct ConsumeArgs {
    /// Number of messages to forward per invocation.
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,
}

impl ConsumeArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let config = ConnectionConfig::from_env().context(ConfigSnafu {})?;

        println!("Starting floe stream ingestor over stdin");
        println!("Target table: {}", config.table);

        let service = Arc::new(RestIngestService::new(&config));
        let pipeline = Arc::new(IngestPipeline::new(service, config));
        let ingestor = StreamIngestor::new(pipeline);

        let reader = BufReader::new(tokio::io::stdin());
        let lines = stream::unfold(reader.lines(), |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((line, lines)),
                Ok(None) => None,
                Err(error) => {
                    tracing::warn!(%error, "failed to read from stdin");
                    None
                }
            }
        });

        let chunks = lines
            .filter(|line| future::ready(!line.trim().is_empty()))
            .chunks(self.chunk_size.max(1));

        ingestor.run(chunks, ct).await;

        Ok(())
    }
}
