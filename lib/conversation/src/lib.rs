//! Bounded dialogue context for the rehearsal agent.
//!
//! This crate provides:
//!
//! - **Message log**: append-only per-conversation audit record
//! - **Summarizer**: folds evicted turns into a running summary
//! - **Context window**: keeps the verbatim buffer within its bound
//! - **Assembler**: builds the ordered request for the model
//! - **Dialogue service**: session start, reset, user turns and reports

pub mod assembler;
pub mod error;
pub mod log;
pub mod message;
pub mod persona;
pub mod report;
pub mod service;
pub mod store;
pub mod summarizer;
pub mod window;

pub use assembler::{SUMMARY_LABEL, build_request};
pub use error::{ConversationError, LogError};
pub use log::{InMemoryLog, JsonFileLog, MessageLog};
pub use message::{EntryKind, LogEntry, Turn, TurnRole};
pub use persona::DEFAULT_PERSONA;
pub use report::{ReportConfig, SessionReport, SessionReporter};
pub use service::{DialogueConfig, DialogueService, Reply, ReplyKind, TokenBudgets};
pub use store::{ConversationHandle, ConversationStore};
pub use summarizer::{LlmSummarizer, Summarize, SummarizerConfig};
pub use window::{ContextWindow, ConversationState, EvictionPolicy, WindowConfig};
