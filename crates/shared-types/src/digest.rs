//! # Config Digest
//!
//! A `ConfigDigest` is the 32-byte identifier of one committee configuration.
//!
//! ```text
//! ┌──────────┬──────────────────────────────────────────────┐
//! │ prefix   │ hash (or per-instance transform) of config   │
//! │ 2 bytes  │ 30 bytes                                     │
//! └──────────┴──────────────────────────────────────────────┘
//! ```
//!
//! The prefix names the protocol family. Message routing decides which decoder
//! to use from these two bytes alone, so every digest transform must leave them
//! untouched.

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// A 32-byte hash.
pub type Hash = [u8; 32];

/// Length of a config digest in bytes.
pub const CONFIG_DIGEST_LEN: usize = 32;

/// Length of the protocol-family prefix.
pub const CONFIG_DIGEST_PREFIX_LEN: usize = 2;

/// Protocol-family prefix stored big-endian in the first two digest bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigDigestPrefix(pub u16);

impl ConfigDigestPrefix {
    /// EVM contract configurations.
    pub const EVM: Self = Self(0x0001);
    /// Solana program configurations.
    pub const SOLANA: Self = Self(0x0003);
    /// Multi-chain CCIP configurations.
    pub const CCIP_MULTI_CHAIN: Self = Self(0x000a);
    /// OCR3 capability configurations.
    pub const OCR3_CAPABILITY: Self = Self(0x000e);

    /// Big-endian byte representation.
    pub fn to_bytes(self) -> [u8; CONFIG_DIGEST_PREFIX_LEN] {
        self.0.to_be_bytes()
    }

    /// Parse from the first two bytes of a digest.
    pub fn from_digest(digest: &ConfigDigest) -> Self {
        Self(u16::from_be_bytes([digest.0[0], digest.0[1]]))
    }
}

impl fmt::Display for ConfigDigestPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Deterministic identifier of a committee configuration.
///
/// Immutable once computed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ConfigDigest(pub Hash);

impl ConfigDigest {
    /// Build a digest from a slice, rejecting anything but 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: Hash = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidDigestLength {
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// The protocol-family prefix encoded in the first two bytes.
    pub fn prefix(&self) -> ConfigDigestPrefix {
        ConfigDigestPrefix::from_digest(self)
    }

    /// Return a copy with the first two bytes overwritten by `prefix`.
    pub fn with_prefix(mut self, prefix: ConfigDigestPrefix) -> Self {
        self.0[..CONFIG_DIGEST_PREFIX_LEN].copy_from_slice(&prefix.to_bytes());
        self
    }

    /// True for the all-zero digest (no configuration set yet).
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; CONFIG_DIGEST_LEN]
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Short hex form for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigDigest({})", hex::encode(self.0))
    }
}

impl From<Hash> for ConfigDigest {
    fn from(bytes: Hash) -> Self {
        Self(bytes)
    }
}

/// Keccak-256 over the concatenation of `parts`.
pub fn keccak256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
