//! Driving Ports (API - Inbound)

use chrono::{DateTime, Utc};

/// Get/set pair shared by every consumer of a cooldown cache.
pub trait CooldownApi<K>: Send + Sync {
    /// The cool-down-until timestamp for `key`, or `None` if never set.
    fn get(&self, key: &K) -> Option<DateTime<Utc>>;

    /// Record that `key` cools down until `until`. Last write wins.
    fn set(&self, key: K, until: DateTime<Utc>);
}
