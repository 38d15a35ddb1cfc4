//! Tracing setup shared by the relay binaries
//!
//! Two layers: a console layer controlled by `RUST_LOG` (default `info`)
//! and a daily-rolling JSON file layer at debug level under
//! `~/.signrelay/logs/`. The file layer is skipped when the log
//! directory cannot be created.

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize tracing for a binary, writing the file layer to
/// `log_file_name` in the shared log directory.
///
/// Returns the appender guard that must stay alive for the life of the
/// process, or `None` when only the console layer is active. Calling
/// this more than once leaves the first subscriber in place.
pub fn init(log_file_name: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, log_file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let installed = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_filter(console_filter),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .try_init()
            .is_ok();

        return installed.then_some(guard);
    }

    // Fallback: console only
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_filter(console_filter),
        )
        .try_init();

    None
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<PathBuf> {
    let log_dir = dirs::home_dir()?.join(".signrelay").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
