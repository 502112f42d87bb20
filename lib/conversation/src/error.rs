//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `LogError`: Errors from the message log store
//! - `ConversationError`: Lifecycle and precondition errors

use rehearsal_core::ConversationId;
use std::fmt;

/// Errors from message log operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// Filesystem operation failed.
    Io { path: String },
    /// Stored document could not be parsed.
    Corrupt { path: String },
    /// Document could not be serialized.
    SerializeFailed,
    /// Storage backend refused the operation.
    StorageFailed { reason: String },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path } => write!(f, "log I/O failed for {path}"),
            Self::Corrupt { path } => write!(f, "log document {path} is corrupt"),
            Self::SerializeFailed => f.write_str("failed to serialize log document"),
            Self::StorageFailed { reason } => write!(f, "log storage failed: {reason}"),
        }
    }
}

impl std::error::Error for LogError {}

/// Conversation lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// A turn arrived for a conversation with no live state.
    NoSession { conversation_id: ConversationId },
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession { conversation_id } => {
                write!(f, "no active session for conversation {conversation_id}")
            }
        }
    }
}

impl std::error::Error for ConversationError {}
