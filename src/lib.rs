//! Meme proxy library: a plain-HTTP forward proxy that swaps images.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pool;
pub mod proxy;
pub mod random;
pub mod resilience;
pub mod rewrite;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use lifecycle::Shutdown;
pub use pool::ImagePool;
pub use proxy::ProxyServer;
