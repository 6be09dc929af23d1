//! Accept loop and per-connection dispatch.
//!
//! # Responsibilities
//! - Accept connections until shutdown is signalled
//! - Spawn an independent task per connection
//! - Drain in-flight connections (bounded) before returning

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::ProxyConfig;
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::pool::ImagePool;
use crate::proxy::handler::handle_connection;
use crate::proxy::ProxyContext;

/// The meme proxy server.
pub struct ProxyServer {
    context: Arc<ProxyContext>,
    tracker: ConnectionTracker,
    drain_timeout: Duration,
}

impl ProxyServer {
    /// Create a new server over an already discovered pool.
    pub fn new(config: &ProxyConfig, pool: Arc<ImagePool>) -> Self {
        Self {
            context: Arc::new(ProxyContext::from_config(config, pool)),
            tracker: ConnectionTracker::new(),
            drain_timeout: Duration::from_secs(config.timeouts.drain_secs),
        }
    }

    /// Connection tracker, for observing in-flight connections.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Run the accept loop until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(
            address = %addr,
            images = self.context.pool.len(),
            easter_egg_host = %self.context.easter_egg.host(),
            probability = self.context.transformer.probability(),
            "Proxy server listening"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        let guard = self.tracker.track();
                        let context = Arc::clone(&self.context);
                        tokio::spawn(handle_connection(context, stream, peer_addr, guard));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let in_flight = self.tracker.active_count();
        if in_flight > 0 {
            tracing::info!(connections = in_flight, "Draining in-flight connections");
            if tokio::time::timeout(self.drain_timeout, self.tracker.wait_idle())
                .await
                .is_err()
            {
                tracing::warn!(
                    remaining = self.tracker.active_count(),
                    "Drain timeout elapsed, abandoning remaining connections"
                );
            }
        }

        tracing::info!("Proxy server stopped");
        Ok(())
    }
}
