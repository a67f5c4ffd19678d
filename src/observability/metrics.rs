//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cachelb_sessions_total` (counter): finished sessions by `outcome`
//! - `cachelb_session_errors_total` (counter): failed sessions by `stage`
//! - `cachelb_cache_lookups_total` (counter): lookups by `result` (hit/miss)
//! - `cachelb_backend_selections_total` (counter): selections by `backend`
//! - `cachelb_dispatch_queue_depth` (gauge): connections waiting for a worker
//! - `cachelb_active_connections` (gauge): open client connections
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter serving `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_session(outcome: &'static str) {
    counter!("cachelb_sessions_total", "outcome" => outcome).increment(1);
}

pub fn record_session_error(stage: &'static str) {
    counter!("cachelb_session_errors_total", "stage" => stage).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("cachelb_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_backend_selection(backend: &str) {
    counter!("cachelb_backend_selections_total", "backend" => backend.to_string()).increment(1);
}

pub fn set_queue_depth(depth: usize) {
    gauge!("cachelb_dispatch_queue_depth").set(depth as f64);
}

pub fn set_active_connections(active: u64) {
    gauge!("cachelb_active_connections").set(active as f64);
}
