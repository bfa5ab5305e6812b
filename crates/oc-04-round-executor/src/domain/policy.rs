//! Observation validation policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the leader does with an observation that fails validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationPolicy {
    /// The first invalid observation aborts the round.
    #[default]
    Strict,
    /// Invalid observations are dropped; the round continues while at least
    /// `n - f` valid observations remain.
    ExcludeInvalid,
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationPolicy::Strict => f.write_str("strict"),
            ValidationPolicy::ExcludeInvalid => f.write_str("exclude-invalid"),
        }
    }
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationPolicy::Strict),
            "exclude-invalid" | "exclude_invalid" => Ok(ValidationPolicy::ExcludeInvalid),
            other => Err(format!("unknown validation policy: {}", other)),
        }
    }
}
