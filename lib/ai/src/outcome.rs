//! Fallback-carrying results for remote calls.
//!
//! Remote-call failures never abort a dialogue step. Every call site that
//! talks to the model produces a `CallOutcome`, which always holds a value
//! the caller can use: either the fresh result or a pre-agreed fallback
//! together with the error that forced it.

use crate::error::LlmError;

/// Result of a remote call that degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum CallOutcome<T> {
    /// The remote call succeeded.
    Completed(T),
    /// The remote call failed; `fallback` is the value to use instead.
    Degraded {
        /// Value substituted for the missing result.
        fallback: T,
        /// Why the remote call failed.
        error: LlmError,
    },
}

impl<T> CallOutcome<T> {
    /// Builds an outcome from a call result and a fallback supplier.
    pub fn from_result(result: Result<T, LlmError>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(error) => Self::Degraded {
                fallback: fallback(),
                error,
            },
        }
    }

    /// Returns the value to use, fresh or fallback.
    pub fn into_value(self) -> T {
        match self {
            Self::Completed(value) | Self::Degraded {
                fallback: value, ..
            } => value,
        }
    }

    /// Returns a reference to the value to use.
    pub fn value(&self) -> &T {
        match self {
            Self::Completed(value) | Self::Degraded {
                fallback: value, ..
            } => value,
        }
    }

    /// Returns true if the remote call succeeded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the error if the call degraded.
    #[must_use]
    pub fn error(&self) -> Option<&LlmError> {
        match self {
            Self::Completed(_) => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }
}
