use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::{consume::ConsumeArgs, error::Result, serve::ServeArgs};

mod consume;
mod error;
mod observability;
mod serve;

#[derive(Parser)]
#[command(name = "floe")]
#[command(about = "Forward JSON events to a streaming ingest table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP ingestion endpoint
    Serve {
        #[clap(flatten)]
        inner: ServeArgs,
    },
    /// Forward newline-delimited JSON messages from stdin
    Consume {
        #[clap(flatten)]
        inner: ConsumeArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_observability();

    let cli = Cli::parse();

    let ct = CancellationToken::new();

    let ct_clone = ct.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ct_clone.cancel();
    });

    match cli.command {
        Commands::Serve { inner } => inner.run(ct).await,
        Commands::Consume { inner } => inner.run(ct).await,
    }
}
