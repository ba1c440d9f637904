//! Metrics collection and exposition.
//!
//! # Metrics
//! - `deposit_desk_transactions_total` (counter): by operation, outcome
//! - `deposit_desk_confirmation_seconds` (histogram): submit-to-mined time by operation
//! - `deposit_desk_store_operations_total` (counter): by operation, outcome
//! - `deposit_desk_registrations` (gauge): records after the last save
//! - `deposit_desk_http_requests_total` (counter): by method, status
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::blockchain::types::Operation;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// `outcome` is `"success"` or the classified error kind.
pub fn record_transaction(operation: Operation, outcome: &str) {
    counter!(
        "deposit_desk_transactions_total",
        "operation" => operation.as_str(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

pub fn record_confirmation_time(operation: Operation, elapsed: Duration) {
    histogram!("deposit_desk_confirmation_seconds", "operation" => operation.as_str())
        .record(elapsed.as_secs_f64());
}

pub fn record_store_operation(operation: &'static str, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    counter!(
        "deposit_desk_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_registration_count(count: usize) {
    gauge!("deposit_desk_registrations").set(count as f64);
}

pub fn record_http_request(method: &str, status: u16) {
    counter!(
        "deposit_desk_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
