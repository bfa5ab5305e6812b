//! Node runtime errors

use oc_01_config_tracking::ConfigTrackingError;
use oc_03_health_reporter::HealthError;
use shared_types::{OracleId, TypeError};
use thiserror::Error;

pub type NodeResult<T> = Result<T, NodeError>;

/// Errors surfaced by node wiring and the driver loop.
///
/// Round failures are not in here: they are recorded in the health reporter
/// and the loop moves on to the next round.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid node configuration: {0}")]
    InvalidConfig(String),

    #[error("config tracking failed")]
    ConfigTracking(#[from] ConfigTrackingError),

    #[error("invalid committee")]
    Committee(#[from] TypeError),

    #[error("oracle {0} is not a member of the active committee")]
    NotAMember(OracleId),

    #[error("plugin construction failed for oracle {oracle}")]
    Plugin {
        oracle: OracleId,
        #[source]
        source: anyhow::Error,
    },

    #[error("outcome store failed")]
    OutcomeStore(#[source] anyhow::Error),

    #[error("health reporter failed")]
    Health(#[from] HealthError),
}
