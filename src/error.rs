//! Connection-level errors.
//!
//! Nothing here escapes a connection handler: every variant ends the
//! connection and is logged at the handler boundary.

use std::time::Duration;

use thiserror::Error;

/// Errors that terminate a single proxied connection.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Transport failure on either socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A socket operation exceeded its deadline.
    #[error("{operation} timed out after {}s", timeout.as_secs_f64())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Request line or headers could not be interpreted.
    #[error("malformed request: {0}")]
    MalformedRequest(&'static str),

    /// Request carried no usable `Host` header.
    #[error("request has no Host header")]
    MissingHost,

    /// Origin could not be reached.
    #[error("failed to connect to {authority}: {source}")]
    Connect {
        authority: String,
        #[source]
        source: std::io::Error,
    },

    /// A blocking worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ProxyError {
    /// Peer went away mid-write (reset or broken pipe).
    pub fn is_peer_gone(&self) -> bool {
        match self {
            ProxyError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}
