//! Conversation lifecycle triggers.
//!
//! `DialogueService` ties the pieces together: it owns the live state
//! store, drives the context window on every user turn, calls the model for
//! the reply, and records every event in the message log.
//!
//! Nothing here fails outward. Remote failures become fixed user-visible
//! messages, log write failures are logged and swallowed, and a turn for a
//! conversation without a session gets a guidance message.

use crate::error::ConversationError;
use crate::log::MessageLog;
use crate::message::LogEntry;
use crate::persona::DEFAULT_PERSONA;
use crate::report::{FEEDBACK_FAILURE_MESSAGE, REPORT_REQUEST_MARKER, ReportConfig, SessionReporter};
use crate::store::{ConversationHandle, ConversationStore};
use crate::summarizer::{LlmSummarizer, Summarize, SummarizerConfig};
use crate::window::{ContextWindow, ConversationState, WindowConfig};
use rehearsal_ai::{CallOutcome, LlmBackend, LlmError, LlmRequest, MessageRole};
use rehearsal_core::ConversationId;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Opening line after a session starts.
pub const SESSION_START_REPLY: &str =
    "Thank you for your consent! We can begin the session now.\n\nHi! Will you help me get better?";

/// Opening line after a reset.
pub const RESET_REPLY: &str =
    "Memory cleared! Starting a new conversation.\n\nAnother psychologist... let's see if you can handle me.";

/// Logged as a system entry on reset.
pub const RESET_LOG_ENTRY: &str = "dialogue history cleared";

/// Shown when a turn arrives before a session was started.
pub const NO_SESSION_REPLY: &str = "Please start a session first with /start.";

/// Shown when the reply call fails.
pub const TURN_FAILURE_REPLY: &str = "An error occurred while processing the request.";

/// Output ceilings for each kind of remote call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenBudgets {
    /// Ceiling for folding one evicted turn into the summary.
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
    /// Ceiling for a from-scratch synopsis.
    #[serde(default = "default_batch_max_tokens")]
    pub batch_max_tokens: u32,
    /// Ceiling for the simulated client's reply.
    #[serde(default = "default_reply_max_tokens")]
    pub reply_max_tokens: u32,
    /// Ceiling for supervisor feedback.
    #[serde(default = "default_report_max_tokens")]
    pub report_max_tokens: u32,
}

fn default_summary_max_tokens() -> u32 {
    120
}

fn default_batch_max_tokens() -> u32 {
    300
}

fn default_reply_max_tokens() -> u32 {
    2000
}

fn default_report_max_tokens() -> u32 {
    3000
}

impl Default for TokenBudgets {
    fn default() -> Self {
        Self {
            summary_max_tokens: default_summary_max_tokens(),
            batch_max_tokens: default_batch_max_tokens(),
            reply_max_tokens: default_reply_max_tokens(),
            report_max_tokens: default_report_max_tokens(),
        }
    }
}

/// Dialogue settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DialogueConfig {
    /// Model identifier used for every call.
    #[serde(default = "default_model")]
    pub model: String,

    /// Window bound and eviction policy.
    #[serde(default)]
    pub window: WindowConfig,

    /// Output ceilings.
    #[serde(default)]
    pub budget: TokenBudgets,

    /// Persona instruction for new sessions.
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            window: WindowConfig::default(),
            budget: TokenBudgets::default(),
            persona: default_persona(),
        }
    }
}

impl DialogueConfig {
    /// Summarizer settings derived from this config.
    #[must_use]
    pub fn summarizer(&self) -> SummarizerConfig {
        SummarizerConfig {
            model: self.model.clone(),
            fold_max_tokens: self.budget.summary_max_tokens,
            batch_max_tokens: self.budget.batch_max_tokens,
        }
    }

    /// Report settings derived from this config.
    #[must_use]
    pub fn report(&self) -> ReportConfig {
        ReportConfig {
            model: self.model.clone(),
            max_tokens: self.budget.report_max_tokens,
        }
    }
}

/// What a reply represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Opening line of a new or reset session.
    Greeting,
    /// The simulated client's answer.
    Answer,
    /// Supervisor feedback.
    Feedback,
    /// A precondition was not met.
    Guidance,
    /// A remote call failed.
    Failure,
}

/// Text to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply text.
    pub text: String,
    /// Reply kind.
    pub kind: ReplyKind,
    /// Batch synopsis, present on feedback replies.
    pub synopsis: Option<String>,
}

impl Reply {
    fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            synopsis: None,
        }
    }
}

/// Coordinates live state, the model and the message log.
pub struct DialogueService<B, L, S = LlmSummarizer<B>>
where
    B: LlmBackend,
    L: MessageLog,
    S: Summarize,
{
    backend: Arc<B>,
    log: Arc<L>,
    summarizer: S,
    reporter: SessionReporter<B>,
    window: ContextWindow,
    store: ConversationStore,
    config: DialogueConfig,
}

impl<B: LlmBackend, L: MessageLog> DialogueService<B, L> {
    /// Creates a service whose summarizer shares `backend`.
    #[must_use]
    pub fn new(backend: Arc<B>, log: Arc<L>, config: DialogueConfig) -> Self {
        let summarizer = LlmSummarizer::new(backend.clone(), config.summarizer());
        Self::with_summarizer(backend, log, summarizer, config)
    }
}

impl<B, L, S> DialogueService<B, L, S>
where
    B: LlmBackend,
    L: MessageLog,
    S: Summarize,
{
    /// Creates a service with an explicit summarizer.
    #[must_use]
    pub fn with_summarizer(
        backend: Arc<B>,
        log: Arc<L>,
        summarizer: S,
        config: DialogueConfig,
    ) -> Self {
        Self {
            reporter: SessionReporter::new(backend.clone(), config.report()),
            window: ContextWindow::new(config.window.clone()),
            backend,
            log,
            summarizer,
            store: ConversationStore::new(),
            config,
        }
    }

    /// Returns the live state store.
    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// Returns the live state handle for a conversation.
    ///
    /// # Errors
    ///
    /// Returns `NoSession` if the conversation was never started.
    pub fn session(
        &self,
        conversation_id: ConversationId,
    ) -> rehearsal_core::Result<ConversationHandle, ConversationError> {
        self.store
            .get(conversation_id)
            .ok_or_else(|| ConversationError::NoSession { conversation_id }.into())
    }

    /// Starts a session with fresh state and the configured persona.
    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    pub async fn on_session_start(&self, conversation_id: ConversationId) -> Reply {
        let state = ConversationState::new(self.config.persona.clone());
        info!(session_id = %state.session_id(), "Session started");
        self.store.install(conversation_id, state);
        self.persist(
            conversation_id,
            LogEntry::now(MessageRole::System, self.config.persona.clone()),
        )
        .await;
        Reply::new(ReplyKind::Greeting, SESSION_START_REPLY)
    }

    /// Replaces the conversation's state wholesale.
    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    pub async fn on_reset(&self, conversation_id: ConversationId) -> Reply {
        let state = ConversationState::new(self.config.persona.clone());
        info!(session_id = %state.session_id(), "Session reset");
        self.store.install(conversation_id, state);
        self.persist(
            conversation_id,
            LogEntry::now(MessageRole::System, RESET_LOG_ENTRY),
        )
        .await;
        Reply::new(ReplyKind::Greeting, RESET_REPLY)
    }

    /// Handles one user turn and returns the simulated client's reply.
    #[instrument(skip(self, text), fields(conversation_id = %conversation_id, len = text.len()))]
    pub async fn on_user_text(&self, conversation_id: ConversationId, text: &str) -> Reply {
        let handle = match self.session(conversation_id) {
            Ok(handle) => handle,
            Err(report) => {
                info!(error = %report, "Turn rejected");
                return Reply::new(ReplyKind::Guidance, NO_SESSION_REPLY);
            }
        };
        let mut state = handle.lock().await;

        self.persist(conversation_id, LogEntry::now(MessageRole::User, text))
            .await;

        let messages = self
            .window
            .submit_user_turn(&mut state, text, &self.summarizer)
            .await;
        let request = LlmRequest::new(
            self.config.model.clone(),
            messages,
            self.config.budget.reply_max_tokens,
        );

        let outcome = CallOutcome::from_result(self.complete(&request).await, || {
            TURN_FAILURE_REPLY.to_string()
        });

        match outcome {
            CallOutcome::Completed(reply) => {
                self.window
                    .record_assistant_turn(&mut state, reply.clone(), &self.summarizer)
                    .await;
                self.persist(
                    conversation_id,
                    LogEntry::now(MessageRole::Assistant, reply.clone()),
                )
                .await;
                Reply::new(ReplyKind::Answer, reply)
            }
            CallOutcome::Degraded { fallback, error } => {
                error!(
                    session_id = %state.session_id(),
                    error = %error,
                    provider = self.backend.provider_name(),
                    "Reply generation failed"
                );
                Reply::new(ReplyKind::Failure, fallback)
            }
        }
    }

    /// Produces supervisor feedback over the full log.
    ///
    /// Live state is neither read nor written. The feedback pair is logged
    /// under the conversation's turn lock, tagged as feedback.
    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    pub async fn on_report_request(&self, conversation_id: ConversationId) -> Reply {
        let entries = match self.log.load_all(conversation_id).await {
            Ok(entries) => entries,
            Err(report) => {
                error!(error = %report, "Failed to load message log");
                return Reply::new(ReplyKind::Failure, FEEDBACK_FAILURE_MESSAGE);
            }
        };

        let report = self.reporter.generate(&entries, &self.summarizer).await;
        if report.is_empty() {
            return Reply::new(ReplyKind::Guidance, report.feedback.into_value());
        }

        let synopsis = report.synopsis.into_value();
        match report.feedback {
            CallOutcome::Completed(feedback) => {
                // Holding the turn lock keeps the pair adjacent in the log.
                let handle = self.store.get(conversation_id);
                let _turn = match &handle {
                    Some(handle) => Some(handle.lock().await),
                    None => None,
                };
                self.persist(
                    conversation_id,
                    LogEntry::feedback(MessageRole::User, REPORT_REQUEST_MARKER),
                )
                .await;
                self.persist(
                    conversation_id,
                    LogEntry::feedback(MessageRole::Assistant, feedback.clone()),
                )
                .await;
                info!(turns = report.turns_reviewed, "Feedback delivered");
                Reply {
                    text: feedback,
                    kind: ReplyKind::Feedback,
                    synopsis: Some(synopsis),
                }
            }
            CallOutcome::Degraded { fallback, .. } => Reply::new(ReplyKind::Failure, fallback),
        }
    }

    async fn complete(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let response = self.backend.generate(request).await?;
        debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            "Reply generated"
        );
        let text = response.content.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(text.to_string())
    }

    async fn persist(&self, conversation_id: ConversationId, entry: LogEntry) {
        if let Err(report) = self.log.append(conversation_id, entry).await {
            warn!(
                conversation_id = %conversation_id,
                error = %report,
                "Failed to persist log entry; continuing"
            );
        }
    }
}
