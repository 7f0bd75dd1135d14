//! Retry metrics.
//!
//! # Metrics
//! - `http_retry_attempts_total` (counter): attempts sent to the transport, by method
//! - `http_retry_retries_total` (counter): retries scheduled after a backoff, by method
//! - `http_retry_exhausted_total` (counter): calls that ran out of attempts, by method
//! - `http_retry_drain_failures_total` (counter): discarded bodies that failed to drain
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application picks the exporter
//! - Without an installed recorder every call is a no-op

use http::Method;

pub fn record_attempt(method: &Method) {
    ::metrics::counter!("http_retry_attempts_total", "method" => method.to_string()).increment(1);
}

pub fn record_retry(method: &Method) {
    ::metrics::counter!("http_retry_retries_total", "method" => method.to_string()).increment(1);
}

pub fn record_exhausted(method: &Method) {
    ::metrics::counter!("http_retry_exhausted_total", "method" => method.to_string()).increment(1);
}

pub fn record_drain_failure() {
    ::metrics::counter!("http_retry_drain_failures_total").increment(1);
}
