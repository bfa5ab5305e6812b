//! Prometheus scrape endpoint.
//!
//! Serves `GET /metrics` in the text exposition format until the caller's
//! cancellation token fires.

use axum::{http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::metrics::encode_metrics;
use crate::TelemetryError;

/// Router with the single `/metrics` route.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn metrics_handler() -> (StatusCode, String) {
    match encode_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => {
            warn!(%err, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Bind `0.0.0.0:port` and serve metrics until `cancel` fires.
pub async fn serve_metrics(port: u16, cancel: CancellationToken) -> Result<(), TelemetryError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TelemetryError::MetricsServer(format!("bind {}: {}", addr, e)))?;
    serve_metrics_on(listener, cancel).await
}

/// Serve metrics on an already bound listener until `cancel` fires.
pub async fn serve_metrics_on(
    listener: TcpListener,
    cancel: CancellationToken,
) -> Result<(), TelemetryError> {
    let addr = listener
        .local_addr()
        .map_err(|e| TelemetryError::MetricsServer(e.to_string()))?;
    info!(%addr, "metrics endpoint listening");

    axum::serve(listener, metrics_router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| TelemetryError::MetricsServer(e.to_string()))?;

    info!(%addr, "metrics endpoint stopped");
    Ok(())
}
