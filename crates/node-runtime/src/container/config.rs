//! # Node Configuration
//!
//! Unified configuration for the driver loop and the subsystems it wires.
//! Every field has a default; `from_env` overrides them from `OC_*`
//! variables and rejects values it cannot parse.

use crate::error::{NodeError, NodeResult};
use oc_03_health_reporter::HealthReporterConfig;
use oc_04_round_executor::{RoundExecutorConfig, ValidationPolicy};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Index of this oracle in the committee.
    pub node_id: u8,
    /// Pause between round attempts.
    pub round_interval: Duration,
    /// Config polling period, used only when the tracker has no notify channel.
    pub config_poll_interval: Duration,
    /// How long a transmitted report is suppressed from being sent again.
    pub transmit_cooldown: Duration,
    /// Folded into every config digest this node sees.
    pub instance_discriminator: Vec<u8>,
    /// Stop after this many rounds. `None` runs until cancelled.
    pub max_rounds: Option<u64>,
    /// Size of the local demo committee.
    pub committee_size: usize,
    /// Fault threshold of the local demo committee.
    pub fault_tolerance: u8,
    pub executor: RoundExecutorConfig,
    pub health: HealthReporterConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            round_interval: Duration::from_millis(1000),
            config_poll_interval: Duration::from_millis(5000),
            transmit_cooldown: Duration::from_secs(60),
            instance_discriminator: Vec::new(),
            max_rounds: None,
            committee_size: 4,
            fault_tolerance: 1,
            executor: RoundExecutorConfig::default(),
            health: HealthReporterConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OC_NODE_ID`: oracle index (default: 0)
    /// - `OC_ROUND_INTERVAL_MS`: pause between rounds (default: 1000)
    /// - `OC_CONFIG_POLL_INTERVAL_MS`: config polling period (default: 5000)
    /// - `OC_TRANSMIT_COOLDOWN_SECS`: report resend suppression (default: 60)
    /// - `OC_HEALTH_LOOKBACK_SECS`: health reporter window (default: 300)
    /// - `OC_VALIDATION_POLICY`: `strict` or `exclude-invalid` (default: strict)
    /// - `OC_INSTANCE_DISCRIMINATOR`: hex or plain text (default: empty)
    /// - `OC_MAX_ROUNDS`: stop after N rounds (default: unbounded)
    /// - `OC_COMMITTEE_SIZE`, `OC_FAULT_TOLERANCE`: local committee shape
    pub fn from_env() -> NodeResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> NodeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(id) = parse_var(&lookup, "OC_NODE_ID")? {
            config.node_id = id;
        }
        if let Some(ms) = parse_var(&lookup, "OC_ROUND_INTERVAL_MS")? {
            config.round_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "OC_CONFIG_POLL_INTERVAL_MS")? {
            config.config_poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var(&lookup, "OC_TRANSMIT_COOLDOWN_SECS")? {
            config.transmit_cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "OC_HEALTH_LOOKBACK_SECS")? {
            config.health = HealthReporterConfig::new(Duration::from_secs(secs));
        }
        if let Some(policy) = parse_var::<ValidationPolicy, _>(&lookup, "OC_VALIDATION_POLICY")? {
            config.executor.validation_policy = policy;
        }
        if let Some(raw) = lookup("OC_INSTANCE_DISCRIMINATOR") {
            config.instance_discriminator = hex::decode(&raw).unwrap_or_else(|_| raw.into_bytes());
        }
        config.max_rounds = parse_var(&lookup, "OC_MAX_ROUNDS")?;
        if let Some(n) = parse_var(&lookup, "OC_COMMITTEE_SIZE")? {
            config.committee_size = n;
        }
        if let Some(f) = parse_var(&lookup, "OC_FAULT_TOLERANCE")? {
            config.fault_tolerance = f;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the driver loop cannot run with.
    pub fn validate(&self) -> NodeResult<()> {
        if self.round_interval.is_zero() {
            return Err(NodeError::InvalidConfig(
                "round interval must be positive".into(),
            ));
        }
        if self.config_poll_interval.is_zero() {
            return Err(NodeError::InvalidConfig(
                "config poll interval must be positive".into(),
            ));
        }
        if usize::from(self.node_id) >= self.committee_size {
            return Err(NodeError::InvalidConfig(format!(
                "node id {} outside committee of {}",
                self.node_id, self.committee_size
            )));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> NodeResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| NodeError::InvalidEnv { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.node_id, 0);
        assert_eq!(config.round_interval, Duration::from_secs(1));
        assert_eq!(config.max_rounds, None);
        assert_eq!(config.executor.validation_policy, ValidationPolicy::Strict);
        assert_eq!(config.health.lookback, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_from_env() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("OC_NODE_ID", "2"),
            ("OC_ROUND_INTERVAL_MS", "250"),
            ("OC_HEALTH_LOOKBACK_SECS", "30"),
            ("OC_VALIDATION_POLICY", "exclude-invalid"),
            ("OC_INSTANCE_DISCRIMINATOR", "c0ffee"),
            ("OC_MAX_ROUNDS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.node_id, 2);
        assert_eq!(config.round_interval, Duration::from_millis(250));
        assert_eq!(config.health.lookback, Duration::from_secs(30));
        assert_eq!(
            config.executor.validation_policy,
            ValidationPolicy::ExcludeInvalid
        );
        assert_eq!(config.instance_discriminator, vec![0xc0, 0xff, 0xee]);
        assert_eq!(config.max_rounds, Some(10));
    }

    #[test]
    fn test_plain_text_discriminator() {
        let config =
            NodeConfig::from_lookup(lookup(&[("OC_INSTANCE_DISCRIMINATOR", "commit")])).unwrap();
        assert_eq!(config.instance_discriminator, b"commit".to_vec());
    }

    #[test]
    fn test_unparseable_value_is_rejected() {
        let err = NodeConfig::from_lookup(lookup(&[("OC_MAX_ROUNDS", "many")])).unwrap_err();
        assert!(matches!(
            err,
            NodeError::InvalidEnv {
                var: "OC_MAX_ROUNDS",
                ..
            }
        ));
    }

    #[test]
    fn test_node_outside_committee_is_rejected() {
        let err = NodeConfig::from_lookup(lookup(&[("OC_NODE_ID", "4")])).unwrap_err();
        assert!(matches!(err, NodeError::InvalidConfig(_)));
    }
}
