//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared by value / Arc with the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError, ConfigOverrides};
pub use schema::{
    EasterEggConfig, FramingConfig, ListenerConfig, ObservabilityConfig, PoolConfig, ProxyConfig,
    SubstitutionConfig, TimeoutConfig, UpstreamConfig,
};
