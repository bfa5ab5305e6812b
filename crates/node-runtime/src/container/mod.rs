//! # Node Container
//!
//! Configuration plus the wiring helpers that assemble a local committee:
//! an in-memory config source behind the digest-transforming tracker, and a
//! committee configuration digested the same way the contract would.

pub mod config;

pub use config::NodeConfig;

use crate::error::NodeResult;
use oc_01_config_tracking::{
    ConfigDigester, DigestTransformingTracker, DiscriminatorTransform, InMemoryConfigTracker,
};
use shared_types::{keccak256, ContractConfig};
use std::sync::Arc;

/// Chain id the local committee's digests are bound to.
pub const LOCAL_CHAIN_ID: u64 = 1337;

/// Address of the local config contract.
pub const LOCAL_CONTRACT_ADDRESS: [u8; 20] = [0x0c; 20];

/// Tracker stack of a local node.
pub type LocalTracker = DigestTransformingTracker<InMemoryConfigTracker, DiscriminatorTransform>;

/// Build the configuration of an `n`-member local committee and stamp it with
/// its digest.
pub fn local_contract_config(
    digester: &dyn ConfigDigester,
    n: usize,
    f: u8,
    config_count: u64,
) -> NodeResult<ContractConfig> {
    let mut config = ContractConfig {
        config_count,
        signers: (0..n as u64)
            .map(|i| keccak256(&[b"local-signer".as_slice(), &i.to_be_bytes()])[..20].to_vec())
            .collect(),
        transmitters: (0..n).map(|i| format!("0x{:040x}", i + 1)).collect(),
        f,
        offchain_config_version: 1,
        ..Default::default()
    };
    config.config_digest = digester.config_digest(&config)?;
    Ok(config)
}

/// In-memory config source and the transforming tracker the node reads from.
///
/// Publish configurations through the first handle; hand the second to the
/// node.
pub fn local_tracker(discriminator: Vec<u8>) -> (Arc<InMemoryConfigTracker>, Arc<LocalTracker>) {
    let source = Arc::new(InMemoryConfigTracker::new());
    let tracker = Arc::new(DigestTransformingTracker::new(
        source.clone(),
        DiscriminatorTransform::new(discriminator),
    ));
    (source, tracker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oc_01_config_tracking::{ContractConfigTracker, Keccak256ConfigDigester};
    use shared_types::{Committee, ConfigDigestPrefix};
    use tokio_util::sync::CancellationToken;

    fn digester() -> Keccak256ConfigDigester {
        Keccak256ConfigDigester::evm(LOCAL_CHAIN_ID, LOCAL_CONTRACT_ADDRESS.to_vec())
    }

    #[test]
    fn test_local_config_forms_valid_committee() {
        let config = local_contract_config(&digester(), 4, 1, 1).unwrap();
        let committee = Committee::from_contract_config(&config).unwrap();
        assert_eq!(committee.n(), 4);
        assert_eq!(committee.quorum(), 3);
        assert_eq!(config.config_digest.prefix(), ConfigDigestPrefix::EVM);
    }

    #[test]
    fn test_config_count_changes_digest() {
        let a = local_contract_config(&digester(), 4, 1, 1).unwrap();
        let b = local_contract_config(&digester(), 4, 1, 2).unwrap();
        assert_ne!(a.config_digest, b.config_digest);
    }

    #[test]
    fn test_invalid_shape_is_rejected() {
        assert!(local_contract_config(&digester(), 3, 1, 1).is_err());
    }

    #[tokio::test]
    async fn test_local_tracker_transforms_published_digest() {
        let (source, tracker) = local_tracker(b"node-a".to_vec());
        let config = local_contract_config(&digester(), 4, 1, 1).unwrap();
        source.set_config(config.clone());

        let details = tracker
            .latest_config_details(&CancellationToken::new())
            .await
            .unwrap();
        assert_ne!(details.config_digest, config.config_digest);
        assert_eq!(details.config_digest.prefix(), config.config_digest.prefix());
    }
}
