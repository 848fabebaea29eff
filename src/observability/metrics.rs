//! Metrics collection.
//!
//! # Responsibilities
//! - Define client metrics (attempts, retries, call latency, rejections)
//! - Record through the `metrics` facade; the embedding application picks the exporter
//!
//! # Metrics
//! - `blnk_client_attempts_total` (counter): attempts by outcome
//! - `blnk_client_retries_total` (counter): backoff sleeps taken
//! - `blnk_client_calls_total` (counter): logical calls by method, result
//! - `blnk_client_call_duration_seconds` (histogram): latency across all attempts
//! - `blnk_allocation_rejections_total` (counter): validator rejections by reason
//!
//! # Design Decisions
//! - Low-overhead metric updates (no-op until a recorder is installed)
//! - Labels are static strings to bound cardinality

use std::time::Instant;

use crate::allocation::ValidationErrorKind;

/// Record the classified outcome of a single attempt.
pub fn record_attempt(outcome: &'static str) {
    metrics::counter!("blnk_client_attempts_total", "outcome" => outcome).increment(1);
}

/// Record a backoff sleep before another attempt.
pub fn record_retry() {
    metrics::counter!("blnk_client_retries_total").increment(1);
}

/// Record the terminal result of a logical call.
pub fn record_call(method: &str, result: &'static str, start: Instant) {
    let method = method.to_string();
    metrics::counter!("blnk_client_calls_total", "method" => method.clone(), "result" => result)
        .increment(1);
    metrics::histogram!("blnk_client_call_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// Record a transfer rejected by the allocation validator.
pub fn record_allocation_rejected(kind: ValidationErrorKind) {
    metrics::counter!("blnk_allocation_rejections_total", "reason" => kind.as_str()).increment(1);
}
