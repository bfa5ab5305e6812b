//! In-memory outcome store

use crate::ports::{OutcomeStore, PersistedOutcome};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ConfigDigest;
use std::collections::HashMap;
use tracing::trace;

/// Keeps the latest round state per config digest in process memory.
///
/// Survives executor reconfiguration but not a process restart.
#[derive(Default)]
pub struct InMemoryOutcomeStore {
    records: RwLock<HashMap<ConfigDigest, PersistedOutcome>>,
}

impl InMemoryOutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl OutcomeStore for InMemoryOutcomeStore {
    async fn load(&self, config_digest: &ConfigDigest) -> anyhow::Result<Option<PersistedOutcome>> {
        Ok(self.records.read().get(config_digest).cloned())
    }

    async fn store(&self, record: PersistedOutcome) -> anyhow::Result<()> {
        trace!(
            seq_nr = record.seq_nr,
            last_attempted_seq_nr = record.last_attempted_seq_nr,
            config_digest = %record.config_digest.short(),
            "round state persisted"
        );
        self.records.write().insert(record.config_digest, record);
        Ok(())
    }
}
