//! Cooldown cache service

use crate::error::{CacheError, CacheResult};
use crate::metrics;
use crate::ports::inbound::CooldownApi;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use shared_types::Hash;
use std::collections::HashMap;
use std::hash::Hash as StdHash;
use std::time::Duration;
use tracing::{debug, warn};

/// Concurrency-safe map from key to "cool down until" timestamp.
///
/// Each entry is written under the write lock in one step, so readers see
/// either the old value or the new one, never a partial write.
pub struct CooldownCache<K = Hash> {
    entries: RwLock<HashMap<K, DateTime<Utc>>>,
}

impl<K: Eq + StdHash> CooldownCache<K> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// True while `now` is strictly before the stored timestamp.
    pub fn is_cooling_down(&self, key: &K, now: DateTime<Utc>) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|until| now < *until)
    }

    /// Cool `key` down for `duration` from the current wall clock.
    ///
    /// Returns the stored timestamp.
    pub fn cool_down_for(&self, key: K, duration: ChronoDuration) -> DateTime<Utc> {
        let until = Utc::now() + duration;
        self.insert(key, until);
        until
    }

    /// Remove every entry whose cool-down ended at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, until| *until > now);
        let removed = before - entries.len();
        metrics::set_entries(entries.len());
        drop(entries);

        if removed > 0 {
            metrics::record_pruned(removed);
            debug!(removed, "[oc-02] pruned expired cooldowns");
        }
        removed
    }

    /// Like `get`, but gives up if the read lock is not available within
    /// `timeout`.
    pub fn get_within(&self, key: &K, timeout: Duration) -> CacheResult<Option<DateTime<Utc>>> {
        match self.entries.try_read_for(timeout) {
            Some(entries) => Ok(entries.get(key).copied()),
            None => Err(deadline_exceeded("get", timeout)),
        }
    }

    /// Like `set`, but gives up if the write lock is not available within
    /// `timeout`. The entry is untouched on failure.
    pub fn set_within(&self, key: K, until: DateTime<Utc>, timeout: Duration) -> CacheResult<()> {
        match self.entries.try_write_for(timeout) {
            Some(mut entries) => {
                entries.insert(key, until);
                metrics::set_entries(entries.len());
                Ok(())
            }
            None => Err(deadline_exceeded("set", timeout)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn lookup(&self, key: &K) -> Option<DateTime<Utc>> {
        self.entries.read().get(key).copied()
    }

    fn insert(&self, key: K, until: DateTime<Utc>) {
        let mut entries = self.entries.write();
        entries.insert(key, until);
        metrics::set_entries(entries.len());
    }
}

fn deadline_exceeded(operation: &'static str, timeout: Duration) -> CacheError {
    metrics::record_deadline_exceeded();
    warn!(operation, ?timeout, "[oc-02] cooldown cache lock wait timed out");
    CacheError::DeadlineExceeded { operation, timeout }
}

impl<K: Eq + StdHash> Default for CooldownCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> CooldownApi<K> for CooldownCache<K>
where
    K: Eq + StdHash + Send + Sync,
{
    fn get(&self, key: &K) -> Option<DateTime<Utc>> {
        self.lookup(key)
    }

    fn set(&self, key: K, until: DateTime<Utc>) {
        self.insert(key, until);
    }
}
