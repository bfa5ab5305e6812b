//! Leader selection
//!
//! Every correct member must pick the same leader for a given
//! `(config_digest, seq_nr)` without talking to the others, so selectors are
//! pure functions of their inputs.

use shared_types::{keccak256, ConfigDigest, SeqNr};

/// Picks the committee index of the round leader.
pub trait LeaderSelector: Send + Sync {
    /// Index into a committee of size `n`, or `None` when `n == 0`.
    fn select(&self, config_digest: &ConfigDigest, seq_nr: SeqNr, n: usize) -> Option<usize>;
}

/// Keyed pseudo-random selection: `keccak256(digest || seq_nr) mod n`.
///
/// Leaders look random across rounds and differ between configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedLeaderSelector;

impl LeaderSelector for KeyedLeaderSelector {
    fn select(&self, config_digest: &ConfigDigest, seq_nr: SeqNr, n: usize) -> Option<usize> {
        if n == 0 {
            return None;
        }
        let seed = keccak256(&[config_digest.as_bytes(), &seq_nr.to_be_bytes()]);
        let mut word = [0u8; 8];
        word.copy_from_slice(&seed[..8]);
        Some((u64::from_be_bytes(word) % n as u64) as usize)
    }
}

/// `seq_nr mod n`. Predictable, mostly useful in tests and local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinLeaderSelector;

impl LeaderSelector for RoundRobinLeaderSelector {
    fn select(&self, _config_digest: &ConfigDigest, seq_nr: SeqNr, n: usize) -> Option<usize> {
        if n == 0 {
            return None;
        }
        Some((seq_nr % n as u64) as usize)
    }
}
