//! # Cooldown Cache Metrics
//!
//! Enable with the `metrics` feature. Without it every recorder is a no-op.
//!
//! - `oc_cooldown_cache_entries` - Gauge of keys currently held
//! - `oc_cooldown_cache_pruned_total` - Keys removed by caller-driven pruning
//! - `oc_cooldown_cache_deadline_exceeded_total` - Operations that gave up on the lock

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref COOLDOWN_ENTRIES: IntGauge = register_int_gauge!(
        "oc_cooldown_cache_entries",
        "Number of keys held by the cooldown cache"
    )
    .expect("Failed to create COOLDOWN_ENTRIES metric");

    pub static ref COOLDOWN_PRUNED: IntCounter = register_int_counter!(
        "oc_cooldown_cache_pruned_total",
        "Keys removed by caller-driven pruning"
    )
    .expect("Failed to create COOLDOWN_PRUNED metric");

    pub static ref COOLDOWN_DEADLINE_EXCEEDED: IntCounter = register_int_counter!(
        "oc_cooldown_cache_deadline_exceeded_total",
        "Cache operations that gave up waiting for the lock"
    )
    .expect("Failed to create COOLDOWN_DEADLINE_EXCEEDED metric");
}

#[cfg(feature = "metrics")]
pub fn set_entries(len: usize) {
    COOLDOWN_ENTRIES.set(len as i64);
}

#[cfg(feature = "metrics")]
pub fn record_pruned(count: usize) {
    COOLDOWN_PRUNED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_deadline_exceeded() {
    COOLDOWN_DEADLINE_EXCEEDED.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn set_entries(_len: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_pruned(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_deadline_exceeded() {}
