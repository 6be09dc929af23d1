//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (probability, timeouts, ports)
//! - Check that addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("listener.backlog must be greater than zero")]
    Backlog,

    #[error("easter_egg.host must not be empty")]
    EasterEggHost,

    #[error("upstream.default_port must be greater than zero")]
    UpstreamPort,

    #[error("substitution.probability {0} is outside 0.0..=1.0")]
    Probability(f64),

    #[error("timeouts.{0} must be greater than zero")]
    Timeout(&'static str),

    #[error("framing.buffer_size must be greater than zero")]
    BufferSize,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::Backlog);
    }
    if config.easter_egg.host.trim().is_empty() {
        errors.push(ValidationError::EasterEggHost);
    }
    if config.upstream.default_port == 0 {
        errors.push(ValidationError::UpstreamPort);
    }

    let probability = config.substitution.probability;
    if !(0.0..=1.0).contains(&probability) {
        errors.push(ValidationError::Probability(probability));
    }

    if config.timeouts.io_secs == 0 {
        errors.push(ValidationError::Timeout("io_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Timeout("connect_secs"));
    }
    if config.framing.buffer_size == 0 {
        errors.push(ValidationError::BufferSize);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.substitution.probability = 1.5;
        config.timeouts.io_secs = 0;
        config.framing.buffer_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Probability(1.5)));
        assert!(errors.contains(&ValidationError::Timeout("io_secs")));
    }

    #[test]
    fn metrics_address_only_checked_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("nope".into())]
        );
    }
}
