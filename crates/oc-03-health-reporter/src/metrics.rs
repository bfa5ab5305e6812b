//! # Health Reporter Metrics
//!
//! Enable with the `metrics` feature. Without it every recorder is a no-op.
//!
//! - `oc_health_errors_added_total` - Errors recorded, labeled by subsystem
//! - `oc_health_errors_pruned_total` - Errors aged out of the lookback window
//! - `oc_health_errors_dropped_total` - Errors added after close

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref ERRORS_ADDED: IntCounterVec = register_int_counter_vec!(
        "oc_health_errors_added_total",
        "Errors recorded by the health reporter",
        &["subsystem"]
    )
    .expect("Failed to create ERRORS_ADDED metric");

    pub static ref ERRORS_PRUNED: IntCounter = register_int_counter!(
        "oc_health_errors_pruned_total",
        "Errors aged out of the lookback window"
    )
    .expect("Failed to create ERRORS_PRUNED metric");

    pub static ref ERRORS_DROPPED: IntCounter = register_int_counter!(
        "oc_health_errors_dropped_total",
        "Errors added after the reporter was closed"
    )
    .expect("Failed to create ERRORS_DROPPED metric");
}

#[cfg(feature = "metrics")]
pub fn record_added(subsystem: &str) {
    ERRORS_ADDED.with_label_values(&[subsystem]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_pruned(count: usize) {
    ERRORS_PRUNED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_dropped() {
    ERRORS_DROPPED.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_added(_subsystem: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_pruned(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_dropped() {}
