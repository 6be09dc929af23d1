//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! server.rs (accept loop)
//!     → tokio::spawn per connection
//!     → handler.rs
//!         read request → route on Host
//!             easter egg host → synthesized page
//!             CONNECT         → close, nothing written
//!             otherwise       → origin (Host, port 80) → read response
//!                             → rewrite::ResponseTransformer → client
//!         → close both sockets
//! ```
//!
//! # Design Decisions
//! - Connections share only read-only state (`ProxyContext`), so no locks
//! - Each connection owns its random generator
//! - Body rewriting runs on the blocking pool (file reads, base64)

pub mod handler;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use crate::config::ProxyConfig;
use crate::http::{EasterEgg, MessageReader};
use crate::pool::ImagePool;
use crate::rewrite::ResponseTransformer;

pub use handler::handle_connection;
pub use server::ProxyServer;

/// Read-only state shared by every connection handler.
#[derive(Debug)]
pub struct ProxyContext {
    pub pool: Arc<ImagePool>,
    pub easter_egg: EasterEgg,
    pub transformer: ResponseTransformer,
    pub reader: MessageReader,
    pub default_port: u16,
    pub io_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ProxyContext {
    pub fn from_config(config: &ProxyConfig, pool: Arc<ImagePool>) -> Self {
        let io_timeout = Duration::from_secs(config.timeouts.io_secs);

        Self {
            easter_egg: EasterEgg::new(config.easter_egg.host.clone(), Arc::clone(&pool)),
            transformer: ResponseTransformer::new(Arc::clone(&pool), config.substitution.probability),
            reader: MessageReader::new(config.framing.buffer_size, io_timeout),
            default_port: config.upstream.default_port,
            io_timeout,
            connect_timeout: Duration::from_secs(config.timeouts.connect_secs),
            pool,
        }
    }
}
