//! Signrelay client binary - watches a folder and relays files for signing

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use signrelay_client::Watcher;
use signrelay_core::config::load_client_config;
use signrelay_core::fsops::ensure_dir;
use signrelay_core::host_for;

/// Code signing client: watches a folder and relays files to the signer
#[derive(Debug, Parser)]
#[command(name = "signrelay-client", version)]
struct Cli {
    /// Path to the client configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = signrelay_core::logging::init("signrelay-client.log");

    let cli = Cli::parse();
    let config = load_client_config(cli.config.as_deref())?;

    ensure_dir(&config.watch_dir)?;
    ensure_dir(&config.output_dir)?;

    let host = host_for(config.run_as_service);
    info!(
        lifecycle = host.name(),
        watch_dir = %config.watch_dir.display(),
        "starting watcher"
    );

    let watcher = Watcher::new(Arc::new(config))?;
    tokio::select! {
        result = watcher.run() => result?,
        _ = host.shutdown_requested() => {}
    }

    Ok(())
}
