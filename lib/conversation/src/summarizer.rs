//! Running-summary maintenance.
//!
//! Two modes:
//! - `fold`: merges exactly one evicted turn into the previous summary under
//!   a small output budget. Used by the context window on every eviction.
//! - `summarize_batch`: summarizes an arbitrary turn sequence from scratch
//!   for reporting. Independent of the fold budget.
//!
//! Neither mode ever fails: a failed remote call degrades to a fallback
//! value (the unchanged summary for `fold`, a fixed notice for the batch).

use crate::message::Turn;
use async_trait::async_trait;
use rehearsal_ai::{CallOutcome, LlmBackend, LlmError, LlmMessage, LlmRequest, PromptTemplate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Returned by `summarize_batch` when there is nothing to summarize.
pub const EMPTY_HISTORY_SUMMARY: &str = "No substantial history to summarize.";

/// Returned by `summarize_batch` when the remote call fails.
pub const BATCH_FAILURE_SUMMARY: &str = "Could not summarize the history.";

/// Placeholder shown to the model in place of an empty summary.
const EMPTY_SUMMARY_MARKER: &str = "—";

/// Summary maintenance seam used by the context window and the report.
#[async_trait]
pub trait Summarize: Send + Sync {
    /// Folds one evicted turn into `previous_summary`.
    ///
    /// On failure the outcome carries `previous_summary` unchanged.
    async fn fold(&self, previous_summary: &str, evicted: &Turn) -> CallOutcome<String>;

    /// Summarizes a full turn sequence from scratch.
    async fn summarize_batch(&self, turns: &[Turn]) -> CallOutcome<String>;
}

/// Output budgets and model for the LLM-backed summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizerConfig {
    /// Model identifier.
    pub model: String,
    /// Hard output ceiling for a fold.
    pub fold_max_tokens: u32,
    /// Output ceiling for a batch summary.
    pub batch_max_tokens: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".to_string(),
            fold_max_tokens: 120,
            batch_max_tokens: 300,
        }
    }
}

fn fold_template() -> PromptTemplate {
    PromptTemplate::new(
        "fold_summary",
        "You have a short summary of a dialogue (it may be empty). Below is a message \
         that is about to be removed from the active context. Add to the summary ONLY \
         materially important information from it, if there is any. If there is nothing \
         important, return the summary unchanged. Return ONLY the final summary, without \
         explanations.\n\n\
         Current summary:\n{{summary}}\n\n\
         New message:\n{{role}}: {{text}}",
    )
    .with_system_prompt("You are an assistant that edits a short dialogue summary.")
    .with_variable("summary")
    .with_variable("role")
    .with_variable("text")
}

fn batch_template() -> PromptTemplate {
    PromptTemplate::new(
        "batch_summary",
        "Briefly summarize the following dialogue history, keeping the key details that \
         may be needed to continue the conversation. Here is the history:\n\n{{history}}",
    )
    .with_system_prompt("You are an assistant that summarizes dialogue history.")
    .with_variable("history")
}

/// Renders turns as `role: text` lines.
#[must_use]
pub fn format_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarizer backed by a remote model.
pub struct LlmSummarizer<B: LlmBackend> {
    backend: Arc<B>,
    config: SummarizerConfig,
    fold_prompt: PromptTemplate,
    batch_prompt: PromptTemplate,
}

impl<B: LlmBackend> LlmSummarizer<B> {
    /// Creates a summarizer sharing `backend`.
    #[must_use]
    pub fn new(backend: Arc<B>, config: SummarizerConfig) -> Self {
        Self {
            backend,
            config,
            fold_prompt: fold_template(),
            batch_prompt: batch_template(),
        }
    }

    /// Renders `template`, sends it once, and returns the trimmed completion.
    async fn complete(
        &self,
        template: &PromptTemplate,
        variables: &HashMap<&str, &str>,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let prompt = template
            .render(variables)
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &template.system_prompt {
            messages.push(LlmMessage::system(system.clone()));
        }
        messages.push(LlmMessage::user(prompt));

        let request = LlmRequest::new(self.config.model.clone(), messages, max_tokens);
        let response = self.backend.generate(&request).await?;
        debug!(
            prompt = %template.name,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Summary call completed"
        );

        let text = response.content.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl<B: LlmBackend> Summarize for LlmSummarizer<B> {
    async fn fold(&self, previous_summary: &str, evicted: &Turn) -> CallOutcome<String> {
        let role = evicted.role.to_string();
        let summary = if previous_summary.is_empty() {
            EMPTY_SUMMARY_MARKER
        } else {
            previous_summary
        };
        let variables = HashMap::from([
            ("summary", summary),
            ("role", role.as_str()),
            ("text", evicted.text.as_str()),
        ]);

        let result = self
            .complete(&self.fold_prompt, &variables, self.config.fold_max_tokens)
            .await;

        match &result {
            Ok(text) if text == EMPTY_SUMMARY_MARKER => {
                debug!("Model echoed the empty-summary placeholder; summary unchanged");
                return CallOutcome::Completed(previous_summary.to_string());
            }
            Ok(_) => debug!(evicted_role = %evicted.role, "Folded evicted turn into summary"),
            Err(e) => warn!(
                error = %e,
                provider = self.backend.provider_name(),
                "Summary fold failed; keeping previous summary"
            ),
        }
        CallOutcome::from_result(result, || previous_summary.to_string())
    }

    async fn summarize_batch(&self, turns: &[Turn]) -> CallOutcome<String> {
        let history = format_history(turns);
        if history.trim().is_empty() {
            return CallOutcome::Completed(EMPTY_HISTORY_SUMMARY.to_string());
        }

        let variables = HashMap::from([("history", history.as_str())]);
        let result = self
            .complete(&self.batch_prompt, &variables, self.config.batch_max_tokens)
            .await;

        if let Err(e) = &result {
            warn!(
                error = %e,
                provider = self.backend.provider_name(),
                turns = turns.len(),
                "Batch summary failed"
            );
        }
        CallOutcome::from_result(result, || BATCH_FAILURE_SUMMARY.to_string())
    }
}
