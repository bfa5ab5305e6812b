//! # Oracle Telemetry
//!
//! Logging and metrics initialisation for oracle committee nodes.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, human readable or
//!   JSON output
//! - **Metrics**: node-level Prometheus registry, scraped from `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oracle_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `oracle-node` | Service name in logs |
//! | `OC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `OC_JSON_LOGS` | `false` (`true` in containers) | JSON log output |
//! | `OC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `OC_METRICS_PORT` | `9100` | Prometheus metrics port, `0` disables the endpoint |

mod config;
mod logging;
pub mod metrics;
mod server;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, CONFIG_CHANGES, LAST_SEQ_NR,
    NODE_ROUNDS, ROUND_DURATION, SUBSYSTEM_ERRORS,
};
pub use server::{metrics_router, serve_metrics, serve_metrics_on};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Metrics endpoint failed: {0}")]
    MetricsServer(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register node metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    init_logging(&config)?;

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_macros_expand() {
        log_event!(info, "round-executor", "round complete", seq_nr = 3u64);
        log_round_event!(warn, "round-executor", "round aborted", 4u64, "abcdef");
    }
}
