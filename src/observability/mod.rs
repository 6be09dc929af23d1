//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per connection)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → optional Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Structured fields (connection_id, host, bytes) for machine parsing
//! - Metrics are cheap and silently dropped when no recorder is installed

pub mod logging;
pub mod metrics;
