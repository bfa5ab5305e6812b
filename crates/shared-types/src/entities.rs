//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Committee**: `OracleId`, `OracleIdentity`, `Committee`, `ContractConfig`
//! - **Round payloads**: `Query`, `Observation`, `Outcome`, `AttributedObservation`
//! - **Reports**: `ReportWithInfo`, `ReportContext`

use crate::digest::ConfigDigest;
use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: THE COMMITTEE
// =============================================================================

/// Per-configuration round sequence number.
pub type SeqNr = u64;

/// Maximum committee size addressable by an `OracleId`.
pub const MAX_ORACLES: usize = 255;

/// Index of an oracle within its committee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OracleId(pub u8);

impl fmt::Display for OracleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oracle-{}", self.0)
    }
}

/// Public identity of one committee member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleIdentity {
    /// Position in the committee.
    pub id: OracleId,
    /// Onchain signing key (verifies attested reports).
    pub signing_key: Vec<u8>,
    /// Account used to submit transactions.
    pub transmit_account: String,
    /// Offchain key used by the peer-to-peer layer.
    pub offchain_public_key: Vec<u8>,
}

/// Ordered committee of `n` oracles tolerating `f` faulty members.
///
/// INVARIANT: `3f + 1 <= n`, checked at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    members: Vec<OracleIdentity>,
    f: u8,
}

impl Committee {
    /// Build a committee, enforcing the BFT safety precondition.
    pub fn new(members: Vec<OracleIdentity>, f: u8) -> Result<Self, TypeError> {
        let n = members.len();
        if n == 0 {
            return Err(TypeError::EmptyCommittee);
        }
        if n > MAX_ORACLES {
            return Err(TypeError::CommitteeTooLarge {
                n,
                max: MAX_ORACLES,
            });
        }
        if 3 * usize::from(f) + 1 > n {
            return Err(TypeError::FaultThresholdTooHigh { n, f });
        }
        let mut seen = [false; MAX_ORACLES + 1];
        for member in &members {
            let idx = usize::from(member.id.0);
            if seen[idx] {
                return Err(TypeError::DuplicateOracle(member.id.0));
            }
            seen[idx] = true;
        }
        Ok(Self { members, f })
    }

    /// Derive the committee described by a contract configuration.
    ///
    /// Oracle ids follow the order of the signer list.
    pub fn from_contract_config(config: &ContractConfig) -> Result<Self, TypeError> {
        config.validate()?;
        let members = config
            .signers
            .iter()
            .zip(config.transmitters.iter())
            .enumerate()
            .map(|(i, (signer, transmitter))| OracleIdentity {
                id: OracleId(i as u8),
                signing_key: signer.clone(),
                transmit_account: transmitter.clone(),
                offchain_public_key: Vec::new(),
            })
            .collect();
        Self::new(members, config.f)
    }

    pub fn members(&self) -> &[OracleIdentity] {
        &self.members
    }

    pub fn oracle_ids(&self) -> Vec<OracleId> {
        self.members.iter().map(|m| m.id).collect()
    }

    /// Committee size `n`.
    pub fn n(&self) -> usize {
        self.members.len()
    }

    /// Fault threshold `f`.
    pub fn f(&self) -> u8 {
        self.f
    }

    /// Minimum number of valid observations, `n - f`.
    pub fn quorum(&self) -> usize {
        self.n() - usize::from(self.f)
    }

    pub fn contains(&self, id: OracleId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }
}

/// Committee configuration as stored by the authoritative config contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Digest of this configuration.
    pub config_digest: ConfigDigest,
    /// Number of configurations set on the contract so far.
    pub config_count: u64,
    /// Onchain signing keys, one per oracle.
    pub signers: Vec<Vec<u8>>,
    /// Transmit accounts, one per oracle.
    pub transmitters: Vec<String>,
    /// Fault threshold.
    pub f: u8,
    /// Application-defined onchain config blob.
    pub onchain_config: Vec<u8>,
    /// Version of the offchain config encoding.
    pub offchain_config_version: u64,
    /// Application-defined offchain config blob.
    pub offchain_config: Vec<u8>,
}

impl ContractConfig {
    /// Check the shape of the configuration before it is digested or adopted.
    pub fn validate(&self) -> Result<(), TypeError> {
        let n = self.signers.len();
        if n != self.transmitters.len() {
            return Err(TypeError::SignerTransmitterMismatch {
                signers: n,
                transmitters: self.transmitters.len(),
            });
        }
        if n == 0 {
            return Err(TypeError::EmptyCommittee);
        }
        if n > MAX_ORACLES {
            return Err(TypeError::CommitteeTooLarge {
                n,
                max: MAX_ORACLES,
            });
        }
        if 3 * usize::from(self.f) + 1 > n {
            return Err(TypeError::FaultThresholdTooHigh { n, f: self.f });
        }
        Ok(())
    }
}

// =============================================================================
// CLUSTER B: ROUND PAYLOADS
// =============================================================================

/// Leader-produced round input. Schema is plugin-defined.
pub type Query = Vec<u8>;

/// One member's response to a `Query`. Schema is plugin-defined.
pub type Observation = Vec<u8>;

/// Aggregated round result, chained into the next round.
pub type Outcome = Vec<u8>;

/// An observation tagged with the member that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributedObservation {
    pub observation: Observation,
    /// Assigned by the collecting node.
    pub observer: OracleId,
}

/// Read-only round context handed to plugin phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeContext<'a> {
    pub seq_nr: SeqNr,
    pub previous_outcome: &'a [u8],
}

// =============================================================================
// CLUSTER C: REPORTS
// =============================================================================

/// An opaque report plus metadata for accept/transmit policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWithInfo<I> {
    pub report: Vec<u8>,
    pub info: I,
}

impl<I> ReportWithInfo<I> {
    pub fn new(report: Vec<u8>, info: I) -> Self {
        Self { report, info }
    }
}

/// Context attached to a report handed to the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    pub config_digest: ConfigDigest,
    pub seq_nr: SeqNr,
    pub epoch: u32,
    pub round: u8,
}

impl ReportContext {
    /// Split a sequence number into `(epoch, round)` coordinates.
    ///
    /// `rounds_per_epoch` is clamped to `1..=255`. The epoch saturates at
    /// `u32::MAX` instead of wrapping.
    pub fn from_seq_nr(config_digest: ConfigDigest, seq_nr: SeqNr, rounds_per_epoch: u8) -> Self {
        let per_epoch = u64::from(rounds_per_epoch.max(1));
        let round = u8::try_from(seq_nr % per_epoch).unwrap_or(u8::MAX);
        Self {
            config_digest,
            seq_nr,
            epoch: u32::try_from(seq_nr / per_epoch).unwrap_or(u32::MAX),
            round,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(i: u8) -> OracleIdentity {
        OracleIdentity {
            id: OracleId(i),
            signing_key: vec![i; 20],
            transmit_account: format!("0x{:040x}", i),
            offchain_public_key: vec![i; 32],
        }
    }

    fn contract_config(n: usize, f: u8) -> ContractConfig {
        ContractConfig {
            config_count: 1,
            signers: (0..n).map(|i| vec![i as u8; 20]).collect(),
            transmitters: (0..n).map(|i| format!("tx-{}", i)).collect(),
            f,
            ..Default::default()
        }
    }

    #[test]
    fn test_committee_enforces_bft_bound() {
        let members: Vec<_> = (0..4).map(identity).collect();
        assert!(Committee::new(members.clone(), 1).is_ok());
        assert_eq!(
            Committee::new(members[..3].to_vec(), 1),
            Err(TypeError::FaultThresholdTooHigh { n: 3, f: 1 })
        );
    }

    #[test]
    fn test_committee_rejects_empty_and_duplicates() {
        assert_eq!(Committee::new(vec![], 0), Err(TypeError::EmptyCommittee));
        assert_eq!(
            Committee::new(vec![identity(1), identity(1)], 0),
            Err(TypeError::DuplicateOracle(1))
        );
    }

    #[test]
    fn test_quorum() {
        let committee = Committee::new((0..7).map(identity).collect(), 2).unwrap();
        assert_eq!(committee.n(), 7);
        assert_eq!(committee.quorum(), 5);
        assert!(committee.contains(OracleId(6)));
        assert!(!committee.contains(OracleId(7)));
    }

    #[test]
    fn test_from_contract_config_orders_by_signer() {
        let committee = Committee::from_contract_config(&contract_config(4, 1)).unwrap();
        assert_eq!(committee.oracle_ids(), vec![OracleId(0), OracleId(1), OracleId(2), OracleId(3)]);
        assert_eq!(committee.members()[2].transmit_account, "tx-2");
    }

    #[test]
    fn test_contract_config_validate() {
        let mut config = contract_config(4, 1);
        assert!(config.validate().is_ok());

        config.transmitters.pop();
        assert_eq!(
            config.validate(),
            Err(TypeError::SignerTransmitterMismatch {
                signers: 4,
                transmitters: 3
            })
        );

        assert_eq!(
            contract_config(0, 0).validate(),
            Err(TypeError::EmptyCommittee)
        );
    }

    #[test]
    fn test_report_context_from_seq_nr() {
        let digest = ConfigDigest([1u8; 32]);
        let ctx = ReportContext::from_seq_nr(digest, 513, 255);
        assert_eq!(ctx.epoch, 2);
        assert_eq!(ctx.round, 3);

        // Zero is clamped to one round per epoch
        let ctx = ReportContext::from_seq_nr(digest, 9, 0);
        assert_eq!(ctx.epoch, 9);
        assert_eq!(ctx.round, 0);
    }

    #[test]
    fn test_report_context_epoch_saturates() {
        let digest = ConfigDigest([1u8; 32]);
        let last_exact = u64::from(u32::MAX) * 255;
        assert_eq!(
            ReportContext::from_seq_nr(digest, last_exact, 255).epoch,
            u32::MAX
        );

        let ctx = ReportContext::from_seq_nr(digest, u64::MAX, 1);
        assert_eq!(ctx.epoch, u32::MAX);
        assert_eq!(ctx.round, 0);

        let ctx = ReportContext::from_seq_nr(digest, u64::MAX, 255);
        assert_eq!(ctx.epoch, u32::MAX);
        assert_eq!(ctx.round, (u64::MAX % 255) as u8);
    }
}
