//! Remote text-generation primitives for the rehearsal dialogue agent.
//!
//! This crate provides:
//!
//! - **Backend**: the `LlmBackend` trait and the ordered role/text request shape
//! - **OpenAI-compatible backend**: HTTP implementation for chat-completion APIs
//! - **Call outcomes**: `CallOutcome`, a result that always carries a usable value
//! - **Prompts**: small `{{variable}}` templates used by the summarizer and report
//! - **Scripted backend**: deterministic backend for tests

pub mod backend;
pub mod error;
pub mod openai;
pub mod outcome;
pub mod prompt;
pub mod scripted;

pub use backend::{LlmBackend, LlmMessage, LlmRequest, LlmResponse, MessageRole, TokenUsage};
pub use error::{LlmError, PromptError};
pub use openai::{LlmBackendConfig, OpenAiCompatibleBackend};
pub use outcome::CallOutcome;
pub use prompt::PromptTemplate;
pub use scripted::ScriptedBackend;
