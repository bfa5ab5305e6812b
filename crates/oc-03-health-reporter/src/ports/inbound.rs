//! Driving Ports (API - Inbound)

use crate::domain::JoinedError;
use crate::error::HealthResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Error aggregation API shared by every subsystem in the process.
#[async_trait]
pub trait HealthApi: Send + Sync {
    /// Record `error` against `subsystem`, stamped with the current time.
    fn add(&self, subsystem: &str, error: anyhow::Error);

    /// Recent errors per subsystem, oldest first. Subsystems with no errors
    /// inside the lookback window are omitted.
    fn report(&self) -> HashMap<String, JoinedError>;

    /// Stop the pruning task and wait for it to exit.
    async fn close(&self) -> HealthResult<()>;
}
