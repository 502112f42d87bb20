//! Supervisor report over a full conversation log.
//!
//! The report reads only the persisted log; live conversation state is
//! never touched. It produces a batch synopsis of the dialogue and
//! professional feedback from a supervisor persona.

use crate::message::{EntryKind, LogEntry, Turn, TurnRole};
use crate::summarizer::Summarize;
use rehearsal_ai::{CallOutcome, LlmBackend, LlmError, LlmMessage, LlmRequest, PromptTemplate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Logged as the user side of a feedback exchange.
pub const REPORT_REQUEST_MARKER: &str = "Professional feedback requested";

/// Shown when feedback generation fails.
pub const FEEDBACK_FAILURE_MESSAGE: &str =
    "An error occurred while generating professional feedback.";

/// Shown when there is no dialogue to review.
pub const EMPTY_TRANSCRIPT_NOTICE: &str =
    "There is no dialogue to review yet. Talk with the client first.";

const SUPERVISOR_SYSTEM_PROMPT: &str = "You are a clinical supervisor with 20 years of experience \
     working with clients who have personality disorders.";

fn feedback_template() -> PromptTemplate {
    PromptTemplate::new(
        "supervisor_feedback",
        "You are an experienced supervising psychologist. Analyze the following training \
         therapy session, in which the psychologist practiced working with a narcissistic \
         client.\n\n\
         Give professional feedback on the following aspects:\n\
         1. The psychologist's communication techniques\n\
         2. Effectiveness of the work with a narcissistic client\n\
         3. Building the therapeutic alliance\n\
         4. Use of active listening techniques\n\
         5. Handling the client's resistance and apathy\n\
         6. Recommendations for improving technique\n\n\
         Response format:\n\
         - Brief session summary\n\
         - Strengths of the psychologist's work\n\
         - Areas for improvement\n\
         - Concrete recommendations\n\n\
         Session synopsis:\n{{synopsis}}\n\n\
         Session transcript:\n\n{{transcript}}",
    )
    .with_system_prompt(SUPERVISOR_SYSTEM_PROMPT)
    .with_variable("synopsis")
    .with_variable("transcript")
}

/// Report settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Model identifier.
    pub model: String,
    /// Output ceiling for the feedback call.
    pub max_tokens: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".to_string(),
            max_tokens: 3000,
        }
    }
}

/// Result of a report pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Number of dialogue turns reviewed.
    pub turns_reviewed: usize,
    /// Batch summary of the dialogue.
    pub synopsis: CallOutcome<String>,
    /// Supervisor feedback.
    pub feedback: CallOutcome<String>,
}

impl SessionReport {
    /// Returns true if there was no dialogue to review.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns_reviewed == 0
    }
}

/// Extracts the dialogue turns from a log.
///
/// System entries and entries tagged as feedback are skipped; the text of
/// an entry never decides whether it is dialogue.
#[must_use]
pub fn transcript_turns(entries: &[LogEntry]) -> Vec<Turn> {
    entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::Dialogue)
        .filter_map(LogEntry::as_turn)
        .collect()
}

/// Renders turns with the session's speaker names.
#[must_use]
pub fn format_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                TurnRole::User => "Psychologist",
                TurnRole::Assistant => "Client",
            };
            format!("{speaker}: {}", turn.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Produces supervisor reports.
pub struct SessionReporter<B: LlmBackend> {
    backend: Arc<B>,
    config: ReportConfig,
    prompt: PromptTemplate,
}

impl<B: LlmBackend> SessionReporter<B> {
    /// Creates a reporter sharing `backend`.
    #[must_use]
    pub fn new(backend: Arc<B>, config: ReportConfig) -> Self {
        Self {
            backend,
            config,
            prompt: feedback_template(),
        }
    }

    /// Builds a report from a full log.
    pub async fn generate<S>(&self, entries: &[LogEntry], summarizer: &S) -> SessionReport
    where
        S: Summarize + ?Sized,
    {
        let turns = transcript_turns(entries);
        if turns.is_empty() {
            return SessionReport {
                turns_reviewed: 0,
                synopsis: CallOutcome::Completed(String::new()),
                feedback: CallOutcome::Completed(EMPTY_TRANSCRIPT_NOTICE.to_string()),
            };
        }

        let synopsis = summarizer.summarize_batch(&turns).await;
        let result = self
            .request_feedback(synopsis.value(), &format_transcript(&turns))
            .await;

        match &result {
            Ok(_) => debug!(turns = turns.len(), "Generated supervisor feedback"),
            Err(e) => warn!(
                error = %e,
                provider = self.backend.provider_name(),
                "Supervisor feedback failed"
            ),
        }

        SessionReport {
            turns_reviewed: turns.len(),
            synopsis,
            feedback: CallOutcome::from_result(result, || FEEDBACK_FAILURE_MESSAGE.to_string()),
        }
    }

    async fn request_feedback(&self, synopsis: &str, transcript: &str) -> Result<String, LlmError> {
        let variables = HashMap::from([("synopsis", synopsis), ("transcript", transcript)]);
        let prompt = self
            .prompt
            .render(&variables)
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        let messages = vec![
            LlmMessage::system(SUPERVISOR_SYSTEM_PROMPT),
            LlmMessage::user(prompt),
        ];
        let request = LlmRequest::new(self.config.model.clone(), messages, self.config.max_tokens);
        let response = self.backend.generate(&request).await?;
        debug!(
            model = %response.model,
            total_tokens = response.usage.total(),
            "Supervisor call completed"
        );

        let text = response.content.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(text.to_string())
    }
}
