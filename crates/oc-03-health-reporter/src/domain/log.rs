//! Per-subsystem error log

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::joined::JoinedError;

/// One recorded error and when it was recorded.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub at: Instant,
    pub error: Arc<anyhow::Error>,
}

/// Append-only, time-ordered error list for one subsystem.
///
/// INVARIANT: `records[i].at <= records[i + 1].at`.
#[derive(Debug, Default)]
pub struct SubsystemLog {
    records: VecDeque<ErrorRecord>,
}

impl SubsystemLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Timestamps earlier than the newest record are clamped
    /// to it so the ordering invariant holds.
    pub fn push(&mut self, at: Instant, error: Arc<anyhow::Error>) {
        let at = match self.records.back() {
            Some(last) if last.at > at => last.at,
            _ => at,
        };
        self.records.push_back(ErrorRecord { at, error });
    }

    /// Drop records older than `lookback`, stopping at the first record still
    /// inside the window. Returns the number removed.
    pub fn prune(&mut self, now: Instant, lookback: Duration) -> usize {
        let mut removed = 0;
        while let Some(front) = self.records.front() {
            if !is_expired(front.at, now, lookback) {
                break;
            }
            self.records.pop_front();
            removed += 1;
        }
        removed
    }

    /// Records inside the window, without mutating the log.
    pub fn recent(&self, now: Instant, lookback: Duration) -> JoinedError {
        JoinedError::new(
            self.records
                .iter()
                .skip_while(|r| is_expired(r.at, now, lookback))
                .map(|r| r.error.clone())
                .collect(),
        )
    }

    pub fn joined(&self) -> JoinedError {
        JoinedError::new(self.records.iter().map(|r| r.error.clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn is_expired(at: Instant, now: Instant, lookback: Duration) -> bool {
    now.saturating_duration_since(at) > lookback
}
