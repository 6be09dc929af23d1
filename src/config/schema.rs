//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the meme proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, backlog).
    pub listener: ListenerConfig,

    /// Image pool source.
    pub pool: PoolConfig,

    /// Host that is answered locally with a synthesized page.
    pub easter_egg: EasterEggConfig,

    /// Origin connection settings.
    pub upstream: UpstreamConfig,

    /// Substitution policy.
    pub substitution: SubstitutionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Message framing settings.
    pub framing: FramingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// OS listen backlog.
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            backlog: 5,
        }
    }
}

/// Image pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Directory scanned (non-recursively) for candidate images.
    pub directory: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            directory: "memes".to_string(),
        }
    }
}

/// Easter egg configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EasterEggConfig {
    /// `Host` header value (exact match) that triggers the easter egg.
    pub host: String,
}

impl Default for EasterEggConfig {
    fn default() -> Self {
        Self {
            host: "google.ca".to_string(),
        }
    }
}

/// Upstream (origin) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Port used when the `Host` header carries none.
    pub default_port: u16,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { default_port: 80 }
    }
}

/// Substitution policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    /// Chance (0.0 - 1.0) that a single image is swapped.
    pub probability: f64,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self { probability: 0.5 }
    }
}

/// Timeout configuration for socket operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-operation read/write timeout in seconds.
    pub io_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// How long shutdown waits for in-flight connections, in seconds.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            io_secs: 10,
            connect_secs: 10,
            drain_secs: 5,
        }
    }
}

/// Framing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Capacity of a single socket read in bytes.
    pub buffer_size: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self { buffer_size: 4096 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.listener.backlog, 5);
        assert_eq!(config.pool.directory, "memes");
        assert_eq!(config.easter_egg.host, "google.ca");
        assert_eq!(config.upstream.default_port, 80);
        assert_eq!(config.substitution.probability, 0.5);
        assert_eq!(config.timeouts.io_secs, 10);
        assert_eq!(config.framing.buffer_size, 4096);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "0.0.0.0:3128"

            [substitution]
            probability = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:3128");
        assert_eq!(config.listener.backlog, 5);
        assert_eq!(config.substitution.probability, 1.0);
        assert_eq!(config.easter_egg.host, "google.ca");
    }
}
