//! Signrelay server binary - hosts the sign endpoint

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use signrelay_core::config::load_server_config;
use signrelay_core::fsops::ensure_dir;
use signrelay_core::host_for;
use signrelay_server::{router, ServerState};

/// Code signing server: accepts uploads and returns signed artifacts
#[derive(Debug, Parser)]
#[command(name = "signrelay-server", version)]
struct Cli {
    /// Path to the server configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = signrelay_core::logging::init("signrelay-server.log");

    let cli = Cli::parse();
    let mut config = load_server_config(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    ensure_dir(&config.work_dir)?;

    let host = host_for(config.run_as_service);
    info!(lifecycle = host.name(), "starting sign endpoint");

    let addr = format!("{}:{}", config.host, config.port);
    let app = router(Arc::new(ServerState::new(config)));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { host.shutdown_requested().await })
        .await?;

    Ok(())
}
