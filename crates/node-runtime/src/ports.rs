//! Driven ports of the node runtime

use async_trait::async_trait;
use oc_04_round_executor::ReportingPlugin;
use shared_types::{ConfigDigest, ContractConfig, OracleIdentity, Outcome, SeqNr};
use std::sync::Arc;

/// Round state of one configuration: the outcome of the most recent round
/// whose Outcome phase succeeded, and the highest sequence number attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOutcome {
    pub config_digest: ConfigDigest,
    /// Sequence number of the round that produced `outcome`, 0 if none has.
    pub seq_nr: SeqNr,
    /// Highest sequence number handed to a round, aborted rounds included.
    pub last_attempted_seq_nr: SeqNr,
    pub outcome: Outcome,
}

impl PersistedOutcome {
    /// First sequence number a resumed executor may use.
    pub fn next_seq_nr(&self) -> SeqNr {
        self.seq_nr
            .max(self.last_attempted_seq_nr)
            .saturating_add(1)
    }
}

/// Durable home of the previous outcome and the sequence number high-water
/// mark, so a restarted node resumes at the right round boundary without
/// reusing a sequence number.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// Latest record for `config_digest`, if any.
    async fn load(&self, config_digest: &ConfigDigest) -> anyhow::Result<Option<PersistedOutcome>>;

    /// Replace the record for `record.config_digest`. Called after every
    /// round attempt.
    async fn store(&self, record: PersistedOutcome) -> anyhow::Result<()>;
}

/// Builds the plugin instance acting for one committee member.
///
/// Called once per member every time the node adopts a new configuration.
pub trait PluginFactory: Send + Sync {
    type Plugin: ReportingPlugin + 'static;

    fn new_plugin(
        &self,
        member: &OracleIdentity,
        config: &ContractConfig,
    ) -> anyhow::Result<Arc<Self::Plugin>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seq_nr: SeqNr, last_attempted_seq_nr: SeqNr) -> PersistedOutcome {
        PersistedOutcome {
            config_digest: ConfigDigest([1; 32]),
            seq_nr,
            last_attempted_seq_nr,
            outcome: Vec::new(),
        }
    }

    #[test]
    fn test_next_seq_nr_follows_high_water_mark() {
        assert_eq!(record(5, 5).next_seq_nr(), 6);
        assert_eq!(record(5, 9).next_seq_nr(), 10);
        assert_eq!(record(0, 3).next_seq_nr(), 4);
        // Older records without a high-water mark still resume past the outcome
        assert_eq!(record(7, 0).next_seq_nr(), 8);
        assert_eq!(record(1, SeqNr::MAX).next_seq_nr(), SeqNr::MAX);
    }
}
