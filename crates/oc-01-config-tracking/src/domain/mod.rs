//! Domain module for Config Tracking subsystem
//!
//! ## Core Modules
//! - digester: base Keccak-256 config digest
//! - transform: prefix-preserving per-instance digest transforms

pub mod digester;
pub mod transform;

pub use digester::{Keccak256ConfigDigester, TransformingConfigDigester};
pub use transform::{
    transform_preserving_prefix, DigestTransform, DiscriminatorTransform, IdentityTransform,
};
