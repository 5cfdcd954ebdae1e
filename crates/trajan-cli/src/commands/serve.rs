use crate::cli::ServeArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::web;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub async fn run(args: ServeArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let server_config = config::resolve_server_config(&args)?;

    let address = server_config.address();
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        CliError::Other(anyhow::anyhow!("Failed to bind to {}: {}", address, e))
    })?;
    let local_addr = listener.local_addr()?;

    info!(
        "Serving on http://{} (chunk size {}, upload limit {} bytes).",
        local_addr, server_config.analysis.chunk_size, server_config.max_upload_bytes
    );
    println!("Listening on http://{} (press Ctrl+C to stop)", local_addr);

    web::serve(listener, server_config, shutdown_signal()).await?;
    info!("Server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
