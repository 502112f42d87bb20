//! LLM backend abstraction.
//!
//! A request is an ordered list of role/text pairs plus an output-token
//! ceiling and a model identifier; a response is a single text completion.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One completion call: ordered turns, an output ceiling and a model id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,
    /// Sent in this exact order.
    pub messages: Vec<LlmMessage>,
    /// Output ceiling; the backend never asks for more.
    pub max_tokens: u32,
}

impl LlmRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<LlmMessage>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens,
        }
    }
}

/// Role-tagged text, as the chat-completion wire format expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LlmMessage {
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Instruction text: persona, condensed context, prompt preambles.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Speaker of a message. Also the role recorded in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    /// The psychologist in training.
    User,
    /// The simulated client, or the supervisor in a report.
    Assistant,
}

impl MessageRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single text completion, untrimmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub usage: TokenUsage,
    /// Model reported by the provider, or the requested one if absent.
    pub model: String,
}

/// Provider-reported token counts. Zero when the provider omits them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Remote text-generation collaborator.
///
/// One `generate` is one remote call. Nothing at this layer retries.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Sends the request and returns the completion.
    ///
    /// # Errors
    ///
    /// Transport failures, timeouts, rate limiting, non-success statuses and
    /// unparseable bodies.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Short provider name for log fields.
    fn provider_name(&self) -> &str;
}
