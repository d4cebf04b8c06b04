//! Process-boundary shutdown: close the adapter on SIGINT/SIGTERM.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::base::DatabaseAdapter;
use crate::error::Result;

/// Block until a termination signal arrives, then close the adapter.
pub async fn wait_for_shutdown(adapter: Arc<dyn DatabaseAdapter>) -> Result<()> {
    wait_for_signal().await;
    info!("shutdown signal received, closing adapter");
    adapter.close().await
}

/// Spawn the shutdown watcher as a background task.
pub fn spawn_shutdown_handler(adapter: Arc<dyn DatabaseAdapter>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = wait_for_shutdown(adapter).await {
            error!(error = %err, "adapter close failed during shutdown");
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(err) = result {
                        error!(error = %err, "failed to listen for SIGINT");
                    }
                }
                _ = sigterm.recv() => {}
            }
        }
        Err(err) => {
            error!(error = %err, "failed to install SIGTERM handler, watching SIGINT only");
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for SIGINT");
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
    }
}
