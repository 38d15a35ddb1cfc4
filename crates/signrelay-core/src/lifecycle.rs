//! Process lifecycle hosts
//!
//! Both relay processes run until told to stop, but how "stop" arrives
//! depends on how the process is supervised: an interactive shell sends
//! Ctrl-C, a service manager sends a termination signal. The host is a
//! capability chosen once at startup from configuration and platform
//! detection, not something the process morphs into.

use async_trait::async_trait;
use tracing::info;

/// How the process is supervised and how shutdown is requested
#[async_trait]
pub trait ProcessHost: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Resolve when the supervisor asks the process to stop
    async fn shutdown_requested(&self);
}

/// Interactive foreground process; stops on Ctrl-C
pub struct ForegroundHost;

#[async_trait]
impl ProcessHost for ForegroundHost {
    fn name(&self) -> &'static str {
        "foreground"
    }

    async fn shutdown_requested(&self) {
        let _ = tokio::signal::ctrl_c().await;
        info!("interrupt received, shutting down");
    }
}

/// Process supervised by a service manager; stops on SIGTERM (or Ctrl-C)
pub struct ManagedHost;

#[async_trait]
impl ProcessHost for ManagedHost {
    fn name(&self) -> &'static str {
        "managed-service"
    }

    #[cfg(unix)]
    async fn shutdown_requested(&self) {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = term.recv() => info!("termination signal received, shutting down"),
            _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    async fn shutdown_requested(&self) {
        let _ = tokio::signal::ctrl_c().await;
        info!("interrupt received, shutting down");
    }
}

/// Pick the lifecycle host for this run.
///
/// The configuration flag wins; otherwise systemd supervision is detected
/// through the `INVOCATION_ID` variable it sets for managed units.
pub fn host_for(run_as_service: bool) -> Box<dyn ProcessHost> {
    let managed = run_as_service || std::env::var_os("INVOCATION_ID").is_some();
    if managed {
        info!("running under service-manager supervision");
        Box::new(ManagedHost)
    } else {
        Box::new(ForegroundHost)
    }
}
