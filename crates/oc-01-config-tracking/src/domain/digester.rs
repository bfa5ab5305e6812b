//! Config digesters
//!
//! The base digest hashes every field of the configuration together with the
//! chain and contract it lives on, then stamps the protocol-family prefix over
//! the first two bytes.

use crate::domain::transform::{transform_preserving_prefix, DigestTransform};
use crate::error::ConfigTrackingResult;
use crate::ports::inbound::ConfigDigester;
use serde::Serialize;
use shared_types::{keccak256, ConfigDigest, ConfigDigestPrefix, ContractConfig};

/// Canonical encoding of everything a digest commits to.
#[derive(Serialize)]
struct DigestPreimage<'a> {
    chain_id: u64,
    contract_address: &'a [u8],
    config_count: u64,
    signers: &'a [Vec<u8>],
    transmitters: &'a [String],
    f: u8,
    onchain_config: &'a [u8],
    offchain_config_version: u64,
    offchain_config: &'a [u8],
}

/// Keccak-256 digest of a contract configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keccak256ConfigDigester {
    chain_id: u64,
    contract_address: Vec<u8>,
    prefix: ConfigDigestPrefix,
}

impl Keccak256ConfigDigester {
    pub fn new(chain_id: u64, contract_address: Vec<u8>, prefix: ConfigDigestPrefix) -> Self {
        Self {
            chain_id,
            contract_address,
            prefix,
        }
    }

    /// EVM-family digester.
    pub fn evm(chain_id: u64, contract_address: Vec<u8>) -> Self {
        Self::new(chain_id, contract_address, ConfigDigestPrefix::EVM)
    }
}

impl ConfigDigester for Keccak256ConfigDigester {
    fn config_digest(&self, config: &ContractConfig) -> ConfigTrackingResult<ConfigDigest> {
        config.validate()?;

        let preimage = DigestPreimage {
            chain_id: self.chain_id,
            contract_address: &self.contract_address,
            config_count: config.config_count,
            signers: &config.signers,
            transmitters: &config.transmitters,
            f: config.f,
            onchain_config: &config.onchain_config,
            offchain_config_version: config.offchain_config_version,
            offchain_config: &config.offchain_config,
        };
        let encoded = bincode::serialize(&preimage)?;

        Ok(ConfigDigest(keccak256(&[&encoded])).with_prefix(self.prefix))
    }

    fn config_digest_prefix(&self) -> ConfigDigestPrefix {
        self.prefix
    }
}

/// Wraps a base digester and applies a prefix-preserving transform.
///
/// Errors from the base digester are propagated unchanged.
pub struct TransformingConfigDigester<D, X> {
    base: D,
    transform: X,
}

impl<D: ConfigDigester, X: DigestTransform> TransformingConfigDigester<D, X> {
    pub fn new(base: D, transform: X) -> Self {
        Self { base, transform }
    }

    pub fn base(&self) -> &D {
        &self.base
    }
}

impl<D: ConfigDigester, X: DigestTransform> ConfigDigester for TransformingConfigDigester<D, X> {
    fn config_digest(&self, config: &ContractConfig) -> ConfigTrackingResult<ConfigDigest> {
        let digest = self.base.config_digest(config)?;
        Ok(transform_preserving_prefix(&self.transform, digest))
    }

    fn config_digest_prefix(&self) -> ConfigDigestPrefix {
        self.base.config_digest_prefix()
    }
}
