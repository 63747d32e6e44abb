use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use logring::buffer::LogBuffer;
use logring::cli::Cli;
use logring::server::CommandServer;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("logring=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.buffer_config();
    tracing::info!(
        byte_capacity = config.byte_capacity,
        line_slots = config.line_slots,
        "allocating log buffer"
    );

    let state = Arc::new(Mutex::new(LogBuffer::new(&config)?));

    // One producer reading lines from stdin into the shared buffer
    let ingest_state = state.clone();
    let ingest = tokio::spawn(async move {
        if let Err(err) = logring::ingest::run(tokio::io::stdin(), ingest_state).await {
            tracing::error!("ingest task failed: {err}");
        }
    });

    let server = CommandServer::bind(cli.port, state).await?;
    server.run().await?;

    // server only returns after a shutdown request
    ingest.abort();
    Ok(())
}
