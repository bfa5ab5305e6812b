//! Round phase state machine
//!
//! ```text
//! [LeaderSelect] → [Query] → [Observe] → [Validate] → [Outcome]
//!       │             │          │           │            │
//!       │             │          │           │            ↓
//!       │             │          │           │     [GenerateReports] → [AcceptDecision] → [TransmitDecision] → [DONE]
//!       │             │          │           │            │                  │                    │
//!       └─────────────┴──────────┴───────────┴────────────┴──────────────────┴────────────────────┴──→ [ABORTED {phase}]
//! ```
//!
//! Phases run strictly in order. The first error moves the round to the
//! absorbing `Aborted` state tagged with the phase in progress.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    LeaderSelect,
    Query,
    Observe,
    Validate,
    Outcome,
    GenerateReports,
    AcceptDecision,
    TransmitDecision,
}

impl RoundPhase {
    /// All phases in execution order.
    pub const ALL: [RoundPhase; 8] = [
        RoundPhase::LeaderSelect,
        RoundPhase::Query,
        RoundPhase::Observe,
        RoundPhase::Validate,
        RoundPhase::Outcome,
        RoundPhase::GenerateReports,
        RoundPhase::AcceptDecision,
        RoundPhase::TransmitDecision,
    ];

    /// The phase that follows this one, `None` after the last phase.
    pub fn next(self) -> Option<RoundPhase> {
        match self {
            RoundPhase::LeaderSelect => Some(RoundPhase::Query),
            RoundPhase::Query => Some(RoundPhase::Observe),
            RoundPhase::Observe => Some(RoundPhase::Validate),
            RoundPhase::Validate => Some(RoundPhase::Outcome),
            RoundPhase::Outcome => Some(RoundPhase::GenerateReports),
            RoundPhase::GenerateReports => Some(RoundPhase::AcceptDecision),
            RoundPhase::AcceptDecision => Some(RoundPhase::TransmitDecision),
            RoundPhase::TransmitDecision => None,
        }
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            RoundPhase::LeaderSelect => "leader_select",
            RoundPhase::Query => "query",
            RoundPhase::Observe => "observe",
            RoundPhase::Validate => "validate",
            RoundPhase::Outcome => "outcome",
            RoundPhase::GenerateReports => "generate_reports",
            RoundPhase::AcceptDecision => "accept_decision",
            RoundPhase::TransmitDecision => "transmit_decision",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    Running(RoundPhase),
    Done,
    Aborted { phase: RoundPhase },
}

impl Default for RoundState {
    fn default() -> Self {
        RoundState::Running(RoundPhase::LeaderSelect)
    }
}

impl RoundState {
    /// Move to the next phase, or to `Done` after the last one.
    ///
    /// Terminal states are absorbing.
    pub fn advance(self) -> RoundState {
        match self {
            RoundState::Running(phase) => match phase.next() {
                Some(next) => RoundState::Running(next),
                None => RoundState::Done,
            },
            terminal => terminal,
        }
    }

    /// Abort in the current phase. Terminal states are absorbing.
    pub fn abort(self) -> RoundState {
        match self {
            RoundState::Running(phase) => RoundState::Aborted { phase },
            terminal => terminal,
        }
    }

    pub fn phase(self) -> Option<RoundPhase> {
        match self {
            RoundState::Running(phase) | RoundState::Aborted { phase } => Some(phase),
            RoundState::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RoundState::Running(_))
    }
}
