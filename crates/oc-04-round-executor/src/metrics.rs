//! # Round Executor Metrics
//!
//! Enable with the `metrics` feature. Without it every recorder is a no-op.
//!
//! - `oc_rounds_started_total` - Rounds attempted
//! - `oc_rounds_succeeded_total` - Rounds that reached `Done`
//! - `oc_rounds_aborted_total` - Aborted rounds, labeled by error kind
//! - `oc_reports_total` - Reports, labeled by bucket
//! - `oc_transmit_failures_total` - Transmitter failures

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref ROUNDS_STARTED: IntCounter = register_int_counter!(
        "oc_rounds_started_total",
        "Total number of rounds attempted"
    )
    .expect("Failed to create ROUNDS_STARTED metric");

    pub static ref ROUNDS_SUCCEEDED: IntCounter = register_int_counter!(
        "oc_rounds_succeeded_total",
        "Total number of rounds completed without error"
    )
    .expect("Failed to create ROUNDS_SUCCEEDED metric");

    pub static ref ROUNDS_ABORTED: IntCounterVec = register_int_counter_vec!(
        "oc_rounds_aborted_total",
        "Total number of aborted rounds",
        &["kind"]
    )
    .expect("Failed to create ROUNDS_ABORTED metric");

    pub static ref REPORTS: IntCounterVec = register_int_counter_vec!(
        "oc_reports_total",
        "Reports produced, by bucket",
        &["bucket"]
    )
    .expect("Failed to create REPORTS metric");

    pub static ref TRANSMIT_FAILURES: IntCounter = register_int_counter!(
        "oc_transmit_failures_total",
        "Reports the transmitter failed to publish"
    )
    .expect("Failed to create TRANSMIT_FAILURES metric");
}

#[cfg(feature = "metrics")]
pub fn record_round_started() {
    ROUNDS_STARTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_round_succeeded(transmitted: usize, not_accepted: usize, not_transmitted: usize) {
    ROUNDS_SUCCEEDED.inc();
    REPORTS
        .with_label_values(&["transmitted"])
        .inc_by(transmitted as u64);
    REPORTS
        .with_label_values(&["not_accepted"])
        .inc_by(not_accepted as u64);
    REPORTS
        .with_label_values(&["not_transmitted"])
        .inc_by(not_transmitted as u64);
}

#[cfg(feature = "metrics")]
pub fn record_round_aborted(kind: &str) {
    ROUNDS_ABORTED.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_transmit_failure() {
    TRANSMIT_FAILURES.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_round_started() {}

#[cfg(not(feature = "metrics"))]
pub fn record_round_succeeded(_transmitted: usize, _not_accepted: usize, _not_transmitted: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_round_aborted(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_transmit_failure() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_callable_in_any_build() {
        record_round_started();
        record_round_succeeded(1, 0, 2);
        record_round_aborted("query");
        record_transmit_failure();
    }
}
