//! Remote-call and prompt errors.
//!
//! `LlmError` never escapes the dialogue core as a failure: call sites wrap
//! it in a `CallOutcome` next to the fallback they used instead.

use std::fmt;

/// Why a completion call produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Transport error or a non-success HTTP status other than 429.
    RequestFailed { reason: String },
    /// The body was not a chat-completion document.
    ResponseParseFailed { reason: String },
    /// The completion was missing or blank.
    EmptyCompletion,
    /// The configured request timeout elapsed.
    Timeout,
    /// HTTP 429, with the provider's `Retry-After` hint if it sent one.
    RateLimited { retry_after_secs: Option<u64> },
    /// The backend or a prompt could not be set up.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => write!(f, "completion request failed: {reason}"),
            Self::ResponseParseFailed { reason } => {
                write!(f, "completion response unreadable: {reason}")
            }
            Self::EmptyCompletion => f.write_str("model returned no text"),
            Self::Timeout => f.write_str("completion request timed out"),
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "provider rate limit hit, retry in {secs}s"),
            Self::RateLimited {
                retry_after_secs: None,
            } => f.write_str("provider rate limit hit"),
            Self::InvalidConfig { reason } => write!(f, "completion setup invalid: {reason}"),
        }
    }
}

impl std::error::Error for LlmError {}

/// Prompt rendering errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// A variable the template declares was not supplied.
    MissingVariable { template: String, variable: String },
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable { template, variable } => {
                write!(f, "prompt '{template}' needs '{variable}'")
            }
        }
    }
}

impl std::error::Error for PromptError {}
