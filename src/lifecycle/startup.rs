//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the optional metrics endpoint
//! - Discover the image pool before any connection is accepted
//! - Bind the listener last (traffic only when ready)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::pool::{ImagePool, PoolError};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Everything the server needs, ready to run.
pub struct Prepared {
    pub pool: Arc<ImagePool>,
    pub listener: Listener,
}

/// Bring subsystems up in dependency order.
pub fn prepare(config: &ProxyConfig) -> Result<Prepared, StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let pool = Arc::new(ImagePool::discover(&config.pool.directory)?);
    if pool.is_empty() {
        tracing::warn!(
            directory = %config.pool.directory,
            "No images found; responses will pass through unchanged"
        );
    }

    let listener = Listener::bind(&config.listener)?;

    Ok(Prepared { pool, listener })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_with_missing_pool_directory() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.pool.directory = "/no/such/memes".into();

        let prepared = prepare(&config).unwrap();
        assert!(prepared.pool.is_empty());
        assert_ne!(prepared.listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn bind_failure_is_fatal() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "256.0.0.1:80".into();
        assert!(matches!(
            prepare(&config),
            Err(StartupError::Listener(ListenerError::Address(_)))
        ));
    }
}
