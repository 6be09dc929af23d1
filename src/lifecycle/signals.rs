//! OS signal handling.
//!
//! Ctrl+C (SIGINT) triggers a graceful shutdown: the accept loop stops and
//! in-flight connections get a bounded drain period.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C, then trigger `shutdown`.
pub async fn forward_ctrl_c(shutdown: Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Ctrl+C received");
            shutdown.trigger();
        }
        Err(e) => {
            // Without a handler the process runs until killed.
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    }
}
