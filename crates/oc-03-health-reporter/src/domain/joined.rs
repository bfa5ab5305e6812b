//! Joined error aggregate

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Ordered aggregate of errors.
///
/// Unlike a concatenated message, every underlying error stays reachable, so
/// callers can ask whether a specific error type or value is present.
/// `Display` prints each error with its source chain, one per line.
#[derive(Debug, Clone, Default)]
pub struct JoinedError {
    errors: Vec<Arc<anyhow::Error>>,
}

impl JoinedError {
    pub fn new(errors: Vec<Arc<anyhow::Error>>) -> Self {
        Self { errors }
    }

    /// Underlying errors in arrival order.
    pub fn errors(&self) -> &[Arc<anyhow::Error>] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True if any joined error, or any error in its source chain, has type `E`.
    pub fn contains<E>(&self) -> bool
    where
        E: StdError + Send + Sync + 'static,
    {
        self.errors
            .iter()
            .any(|e| e.downcast_ref::<E>().is_some() || e.chain().any(|c| c.is::<E>()))
    }

    /// True if any joined error, or any error in its source chain, equals `target`.
    pub fn is<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + Send + Sync + 'static,
    {
        self.errors.iter().any(|e| {
            e.downcast_ref::<E>() == Some(target)
                || e.chain().any(|c| c.downcast_ref::<E>() == Some(target))
        })
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:#}", error)?;
        }
        Ok(())
    }
}

impl StdError for JoinedError {}
