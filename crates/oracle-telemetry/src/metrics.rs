//! Prometheus metrics for oracle committee nodes.
//!
//! All metrics follow the naming convention: `oc_node_<metric>_<unit>`.
//! Subsystem crates register their own counters behind their `metrics`
//! feature; this registry holds the node-level view.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Node metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Rounds driven by the node, labeled by result (success/aborted)
    pub static ref NODE_ROUNDS: CounterVec = CounterVec::new(
        Opts::new("oc_node_rounds_total", "Rounds driven by this node"),
        &["result"]
    ).expect("metric creation failed");

    /// Wall-clock duration of one round
    pub static ref ROUND_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "oc_node_round_duration_seconds",
            "Time spent executing one round"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Configuration changes adopted
    pub static ref CONFIG_CHANGES: Counter = Counter::new(
        "oc_node_config_changes_total",
        "Configuration digests adopted by this node"
    ).expect("metric creation failed");

    /// Sequence number of the last round attempted
    pub static ref LAST_SEQ_NR: Gauge = Gauge::new(
        "oc_node_last_seq_nr",
        "Sequence number of the last round attempted"
    ).expect("metric creation failed");

    /// Errors recorded in the health reporter, labeled by subsystem
    pub static ref SUBSYSTEM_ERRORS: CounterVec = CounterVec::new(
        Opts::new("oc_node_subsystem_errors_total", "Errors recorded per subsystem"),
        &["subsystem"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register every node metric with `REGISTRY`. Metrics that are already
/// registered are left in place, so calling this twice is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(NODE_ROUNDS.clone()),
        Box::new(ROUND_DURATION.clone()),
        Box::new(CONFIG_CHANGES.clone()),
        Box::new(LAST_SEQ_NR.clone()),
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
