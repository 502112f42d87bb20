//! Turn and log-entry types.

use chrono::{DateTime, Utc};
use rehearsal_ai::{LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// Who produced a turn in the live buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The human side of the dialogue.
    User,
    /// The simulated counterpart.
    Assistant,
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        MessageRole::from(*self).fmt(f)
    }
}

/// One role-tagged message unit in the live buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Turn role.
    pub role: TurnRole,
    /// Turn text.
    pub text: String,
}

impl Turn {
    /// Creates a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Creates an assistant turn.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }

    /// Converts the turn into a request message.
    #[must_use]
    pub fn to_llm_message(&self) -> LlmMessage {
        LlmMessage::new(self.role.into(), self.text.clone())
    }
}

/// What a log entry belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Part of the dialogue, or a lifecycle marker.
    #[default]
    Dialogue,
    /// A supervisor feedback exchange.
    Feedback,
}

impl EntryKind {
    fn is_dialogue(&self) -> bool {
        *self == Self::Dialogue
    }
}

/// An immutable record in a conversation's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry role (`system`, `user` or `assistant`).
    pub role: MessageRole,
    /// Entry text.
    pub content: String,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Entries written before the tag existed read back as dialogue.
    #[serde(default, skip_serializing_if = "EntryKind::is_dialogue")]
    pub kind: EntryKind,
}

impl LogEntry {
    /// Creates a dialogue entry stamped with the current time.
    #[must_use]
    pub fn now(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            kind: EntryKind::Dialogue,
        }
    }

    /// Creates a feedback-exchange entry stamped with the current time.
    #[must_use]
    pub fn feedback(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Feedback,
            ..Self::now(role, content)
        }
    }

    /// Returns the entry as a dialogue turn, or `None` for system entries.
    #[must_use]
    pub fn as_turn(&self) -> Option<Turn> {
        match self.role {
            MessageRole::User => Some(Turn::user(self.content.clone())),
            MessageRole::Assistant => Some(Turn::assistant(self.content.clone())),
            MessageRole::System => None,
        }
    }
}
