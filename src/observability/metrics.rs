//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_connections_total` (counter): accepted client connections
//! - `proxy_active_connections` (gauge): connections currently handled
//! - `proxy_requests_total` (counter): requests by route (`easter_egg`, `forward`, `rejected`)
//! - `proxy_substitutions_total` (counter): swapped images by kind (`html_tag`, `image_body`)
//! - `proxy_transform_failures_total` (counter): responses passed through after a failed rewrite
//! - `proxy_upstream_errors_total` (counter): origin connect/relay failures
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_connection_accepted() {
    metrics::counter!("proxy_connections_total").increment(1);
}

pub fn set_active_connections(count: u64) {
    metrics::gauge!("proxy_active_connections").set(count as f64);
}

pub fn record_request(route: &'static str) {
    metrics::counter!("proxy_requests_total", "route" => route).increment(1);
}

pub fn record_substitutions(kind: &'static str, count: usize) {
    metrics::counter!("proxy_substitutions_total", "kind" => kind).increment(count as u64);
}

pub fn record_transform_failure() {
    metrics::counter!("proxy_transform_failures_total").increment(1);
}

pub fn record_upstream_error() {
    metrics::counter!("proxy_upstream_errors_total").increment(1);
}
