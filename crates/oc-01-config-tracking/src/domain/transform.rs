//! Per-instance digest transforms
//!
//! Several protocol instances can share one config contract (one per plugin
//! type, for example). Folding an instance discriminator into the digest keeps
//! their digests apart while the prefix bytes keep routing messages to the
//! right protocol-family decoder.

use shared_types::{keccak256, ConfigDigest, CONFIG_DIGEST_PREFIX_LEN};

/// Deterministic post-transform applied to a base digest.
pub trait DigestTransform: Send + Sync {
    fn transform(&self, digest: ConfigDigest) -> ConfigDigest;
}

/// Leaves the digest unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl DigestTransform for IdentityTransform {
    fn transform(&self, digest: ConfigDigest) -> ConfigDigest {
        digest
    }
}

/// Folds a discriminator into the digest: `keccak256(digest || discriminator)`.
///
/// An empty discriminator is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscriminatorTransform {
    discriminator: Vec<u8>,
}

impl DiscriminatorTransform {
    pub fn new(discriminator: Vec<u8>) -> Self {
        Self { discriminator }
    }

    pub fn discriminator(&self) -> &[u8] {
        &self.discriminator
    }
}

impl DigestTransform for DiscriminatorTransform {
    fn transform(&self, digest: ConfigDigest) -> ConfigDigest {
        if self.discriminator.is_empty() {
            return digest;
        }
        ConfigDigest(keccak256(&[digest.as_bytes(), &self.discriminator]))
    }
}

impl<T: DigestTransform + ?Sized> DigestTransform for std::sync::Arc<T> {
    fn transform(&self, digest: ConfigDigest) -> ConfigDigest {
        (**self).transform(digest)
    }
}

/// Apply `transform`, then restore the original prefix bytes.
///
/// INVARIANT: `result.prefix() == digest.prefix()` for every transform.
pub fn transform_preserving_prefix<X: DigestTransform + ?Sized>(
    transform: &X,
    digest: ConfigDigest,
) -> ConfigDigest {
    let mut out = transform.transform(digest);
    out.0[..CONFIG_DIGEST_PREFIX_LEN].copy_from_slice(&digest.0[..CONFIG_DIGEST_PREFIX_LEN]);
    out
}
