//! Bounded dialogue context.
//!
//! Each conversation keeps a persona, a short buffer of verbatim turns and a
//! running summary. When the buffer grows past `max_window`, the oldest turn
//! is removed and folded into the summary, one turn per check.
//!
//! Two eviction policies exist:
//! - `AfterEveryAppend`: the bound is checked after both the user append and
//!   the assistant append, so `|buffer| <= max_window` holds after every step.
//! - `AfterUserTurn`: the bound is checked only after the user append. The
//!   assistant append never evicts, so the buffer can exceed the bound by one
//!   after a reply and keeps growing by one per completed exchange.

use crate::assembler;
use crate::message::Turn;
use crate::summarizer::Summarize;
use rehearsal_ai::LlmMessage;
use rehearsal_core::SessionId;
use serde::Deserialize;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// When the window bound is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Check after the user append and after the assistant append.
    #[default]
    AfterEveryAppend,
    /// Check only after the user append.
    AfterUserTurn,
}

/// Window configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowConfig {
    /// Maximum number of verbatim turns kept in the buffer.
    #[serde(default = "default_max_window")]
    pub max_window: usize,

    /// When the bound is checked.
    #[serde(default)]
    pub eviction: EvictionPolicy,
}

fn default_max_window() -> usize {
    6
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_window: default_max_window(),
            eviction: EvictionPolicy::default(),
        }
    }
}

/// Live state of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    session_id: SessionId,
    persona: String,
    buffer: VecDeque<Turn>,
    summary: String,
    evictions: u64,
}

impl ConversationState {
    /// Creates fresh state with an empty buffer and summary.
    #[must_use]
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::new(),
            persona: persona.into(),
            buffer: VecDeque::new(),
            summary: String::new(),
            evictions: 0,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the persona instruction.
    #[must_use]
    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Returns the verbatim turns, oldest first.
    #[must_use]
    pub fn buffer(&self) -> &VecDeque<Turn> {
        &self.buffer
    }

    /// Returns the running summary (possibly empty).
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns how many turns have been evicted so far.
    #[must_use]
    pub fn eviction_count(&self) -> u64 {
        self.evictions
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.buffer.push_back(turn);
    }

    pub(crate) fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }
}

/// Enforces the window bound on conversation state.
#[derive(Debug, Clone, Default)]
pub struct ContextWindow {
    config: WindowConfig,
}

impl ContextWindow {
    /// Creates a window manager.
    ///
    /// A `max_window` of zero is raised to one.
    #[must_use]
    pub fn new(mut config: WindowConfig) -> Self {
        if config.max_window == 0 {
            warn!("max_window of 0 can never hold; using 1");
            config.max_window = 1;
        }
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Appends a user turn, enforces the bound, and returns the request to send.
    pub async fn submit_user_turn<S>(
        &self,
        state: &mut ConversationState,
        text: impl Into<String>,
        summarizer: &S,
    ) -> Vec<LlmMessage>
    where
        S: Summarize + ?Sized,
    {
        state.push_turn(Turn::user(text));
        self.enforce_bound(state, summarizer).await;
        assembler::build_request(state)
    }

    /// Appends the assistant reply; evicts only under `AfterEveryAppend`.
    pub async fn record_assistant_turn<S>(
        &self,
        state: &mut ConversationState,
        text: impl Into<String>,
        summarizer: &S,
    ) where
        S: Summarize + ?Sized,
    {
        state.push_turn(Turn::assistant(text));
        if self.config.eviction == EvictionPolicy::AfterEveryAppend {
            self.enforce_bound(state, summarizer).await;
        }
    }

    /// Evicts at most one turn, oldest first, if the buffer is over the bound.
    ///
    /// Returns the evicted turn.
    pub async fn enforce_bound<S>(
        &self,
        state: &mut ConversationState,
        summarizer: &S,
    ) -> Option<Turn>
    where
        S: Summarize + ?Sized,
    {
        if state.buffer.len() <= self.config.max_window {
            return None;
        }
        let evicted = state.buffer.pop_front()?;

        let outcome = summarizer.fold(&state.summary, &evicted).await;
        if let Some(error) = outcome.error() {
            warn!(
                session_id = %state.session_id,
                error = %error,
                "Summary not updated after eviction"
            );
        }
        state.summary = outcome.into_value();
        state.evictions += 1;

        debug!(
            session_id = %state.session_id,
            buffer_len = state.buffer.len(),
            evictions = state.evictions,
            "Evicted oldest turn"
        );
        Some(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::TurnRole;
    use async_trait::async_trait;
    use rehearsal_ai::{CallOutcome, LlmError};
    use std::sync::Mutex;

    /// Returns the previous summary untouched.
    struct NoopSummarizer;

    #[async_trait]
    impl Summarize for NoopSummarizer {
        async fn fold(&self, previous_summary: &str, _evicted: &Turn) -> CallOutcome<String> {
            CallOutcome::Completed(previous_summary.to_string())
        }

        async fn summarize_batch(&self, _turns: &[Turn]) -> CallOutcome<String> {
            CallOutcome::Completed(String::new())
        }
    }

    /// Always answers with the same text.
    struct FixedSummarizer(&'static str);

    #[async_trait]
    impl Summarize for FixedSummarizer {
        async fn fold(&self, _previous_summary: &str, _evicted: &Turn) -> CallOutcome<String> {
            CallOutcome::Completed(self.0.to_string())
        }

        async fn summarize_batch(&self, _turns: &[Turn]) -> CallOutcome<String> {
            CallOutcome::Completed(self.0.to_string())
        }
    }

    /// Always fails, degrading to the previous summary.
    struct FailingSummarizer;

    #[async_trait]
    impl Summarize for FailingSummarizer {
        async fn fold(&self, previous_summary: &str, _evicted: &Turn) -> CallOutcome<String> {
            CallOutcome::Degraded {
                fallback: previous_summary.to_string(),
                error: LlmError::Timeout,
            }
        }

        async fn summarize_batch(&self, _turns: &[Turn]) -> CallOutcome<String> {
            CallOutcome::Degraded {
                fallback: String::new(),
                error: LlmError::Timeout,
            }
        }
    }

    /// Records every folded turn and appends its text to the summary.
    #[derive(Default)]
    struct RecordingSummarizer {
        folded: Mutex<Vec<Turn>>,
    }

    impl RecordingSummarizer {
        fn folded(&self) -> Vec<Turn> {
            self.folded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Summarize for RecordingSummarizer {
        async fn fold(&self, previous_summary: &str, evicted: &Turn) -> CallOutcome<String> {
            self.folded.lock().unwrap().push(evicted.clone());
            CallOutcome::Completed(format!("{previous_summary}[{}]", evicted.text))
        }

        async fn summarize_batch(&self, _turns: &[Turn]) -> CallOutcome<String> {
            CallOutcome::Completed(String::new())
        }
    }

    fn window(max_window: usize, eviction: EvictionPolicy) -> ContextWindow {
        ContextWindow::new(WindowConfig {
            max_window,
            eviction,
        })
    }

    fn texts(state: &ConversationState) -> Vec<&str> {
        state.buffer().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn window_config_defaults() {
        let config = WindowConfig::default();
        assert_eq!(config.max_window, 6);
        assert_eq!(config.eviction, EvictionPolicy::AfterEveryAppend);
    }

    #[test]
    fn window_config_deserializes_policy() {
        let config: WindowConfig =
            serde_json::from_str(r#"{"eviction": "after_user_turn"}"#).expect("deserialize");
        assert_eq!(config.max_window, 6);
        assert_eq!(config.eviction, EvictionPolicy::AfterUserTurn);
    }

    #[tokio::test]
    async fn zero_window_is_raised_to_one() {
        let window = window(0, EvictionPolicy::AfterEveryAppend);
        assert_eq!(window.config().max_window, 1);

        let mut state = ConversationState::new("p");
        for n in 0..3 {
            window
                .submit_user_turn(&mut state, format!("U{n}"), &NoopSummarizer)
                .await;
            assert_eq!(state.buffer().len(), 1);
            window
                .record_assistant_turn(&mut state, format!("A{n}"), &NoopSummarizer)
                .await;
            assert_eq!(state.buffer().len(), 1);
        }
        assert_eq!(texts(&state), ["A2"]);
    }

    #[tokio::test]
    async fn user_turns_alone_never_exceed_the_bound() {
        for policy in [EvictionPolicy::AfterEveryAppend, EvictionPolicy::AfterUserTurn] {
            for max_window in 1..=4 {
                let window = window(max_window, policy);
                let mut state = ConversationState::new("p");
                for n in 0..(max_window * 3) {
                    window
                        .submit_user_turn(&mut state, format!("U{n}"), &NoopSummarizer)
                        .await;
                    assert!(state.buffer().len() <= max_window);
                }
            }
        }
    }

    #[tokio::test]
    async fn every_append_policy_bounds_full_exchanges() {
        for max_window in 1..=5 {
            let window = window(max_window, EvictionPolicy::AfterEveryAppend);
            let mut state = ConversationState::new("p");
            for n in 0..(max_window * 3) {
                window
                    .submit_user_turn(&mut state, format!("U{n}"), &NoopSummarizer)
                    .await;
                assert!(state.buffer().len() <= max_window);
                window
                    .record_assistant_turn(&mut state, format!("A{n}"), &NoopSummarizer)
                    .await;
                assert!(state.buffer().len() <= max_window);
            }
        }
    }

    #[tokio::test]
    async fn eviction_is_fifo_and_each_turn_is_folded_once() {
        let window = window(3, EvictionPolicy::AfterEveryAppend);
        let summarizer = RecordingSummarizer::default();
        let mut state = ConversationState::new("p");

        for n in 1..=4 {
            window
                .submit_user_turn(&mut state, format!("U{n}"), &summarizer)
                .await;
            window
                .record_assistant_turn(&mut state, format!("A{n}"), &summarizer)
                .await;
        }

        let folded: Vec<String> = summarizer.folded().into_iter().map(|t| t.text).collect();
        assert_eq!(folded, ["U1", "A1", "U2", "A2", "U3"]);
        assert_eq!(texts(&state), ["A3", "U4", "A4"]);
        assert!(
            state
                .buffer()
                .iter()
                .all(|t| !folded.contains(&t.text))
        );
        assert_eq!(state.summary(), "[U1][A1][U2][A2][U3]");
        assert_eq!(state.eviction_count(), 5);
    }

    #[tokio::test]
    async fn noop_summarizer_keeps_summary_constant() {
        let window = window(2, EvictionPolicy::AfterEveryAppend);
        let mut state = ConversationState::new("p");
        state.set_summary("stable");

        for n in 0..10 {
            window
                .submit_user_turn(&mut state, format!("U{n}"), &NoopSummarizer)
                .await;
            window
                .record_assistant_turn(&mut state, format!("A{n}"), &NoopSummarizer)
                .await;
        }

        assert!(state.eviction_count() > 0);
        assert_eq!(state.summary(), "stable");
    }

    #[tokio::test]
    async fn fixed_summarizer_replaces_rather_than_accumulates() {
        let window = window(1, EvictionPolicy::AfterUserTurn);
        let mut state = ConversationState::new("p");

        for n in 0..4 {
            window
                .submit_user_turn(&mut state, format!("U{n}"), &FixedSummarizer("S"))
                .await;
        }

        assert_eq!(state.eviction_count(), 3);
        assert_eq!(state.summary(), "S");
    }

    #[tokio::test]
    async fn failed_fold_leaves_summary_byte_identical() {
        let window = window(1, EvictionPolicy::AfterEveryAppend);
        let mut state = ConversationState::new("p");
        state.set_summary("Prior context, with ünïcode.");
        let before = state.summary().to_string();

        window
            .submit_user_turn(&mut state, "U1", &FailingSummarizer)
            .await;
        window
            .record_assistant_turn(&mut state, "A1", &FailingSummarizer)
            .await;

        assert_eq!(state.eviction_count(), 1);
        assert_eq!(state.summary(), before);
        assert_eq!(texts(&state), ["A1"]);
    }

    #[tokio::test]
    async fn user_turn_policy_reproduces_reply_overflow() {
        let window = window(2, EvictionPolicy::AfterUserTurn);
        let summarizer = RecordingSummarizer::default();
        let mut state = ConversationState::new("p");

        window.submit_user_turn(&mut state, "U1", &summarizer).await;
        window
            .record_assistant_turn(&mut state, "A1", &summarizer)
            .await;
        assert_eq!(texts(&state), ["U1", "A1"]);

        window.submit_user_turn(&mut state, "U2", &summarizer).await;
        assert_eq!(texts(&state), ["A1", "U2"]);
        assert_eq!(summarizer.folded(), [Turn::user("U1")]);
        assert_eq!(state.summary(), "[U1]");

        window
            .record_assistant_turn(&mut state, "A2", &summarizer)
            .await;
        assert_eq!(texts(&state), ["A1", "U2", "A2"]);
        assert_eq!(summarizer.folded().len(), 1);

        window.submit_user_turn(&mut state, "U3", &summarizer).await;
        assert_eq!(texts(&state), ["U2", "A2", "U3"]);
        assert_eq!(summarizer.folded()[1].role, TurnRole::Assistant);
    }

    #[tokio::test]
    async fn every_append_policy_corrects_the_scenario() {
        let window = window(2, EvictionPolicy::AfterEveryAppend);
        let mut state = ConversationState::new("p");

        window.submit_user_turn(&mut state, "U1", &NoopSummarizer).await;
        window
            .record_assistant_turn(&mut state, "A1", &NoopSummarizer)
            .await;
        window.submit_user_turn(&mut state, "U2", &NoopSummarizer).await;
        assert_eq!(texts(&state), ["A1", "U2"]);
        window
            .record_assistant_turn(&mut state, "A2", &NoopSummarizer)
            .await;
        assert_eq!(texts(&state), ["U2", "A2"]);
    }

    #[tokio::test]
    async fn submit_returns_assembled_request() {
        let window = window(6, EvictionPolicy::AfterEveryAppend);
        let mut state = ConversationState::new("persona");

        let messages = window
            .submit_user_turn(&mut state, "hello", &NoopSummarizer)
            .await;

        assert_eq!(
            messages,
            vec![LlmMessage::system("persona"), LlmMessage::user("hello")]
        );
    }

    #[tokio::test]
    async fn under_the_bound_nothing_is_evicted() {
        let window = window(6, EvictionPolicy::AfterEveryAppend);
        let summarizer = RecordingSummarizer::default();
        let mut state = ConversationState::new("p");

        for n in 0..3 {
            window
                .submit_user_turn(&mut state, format!("U{n}"), &summarizer)
                .await;
            window
                .record_assistant_turn(&mut state, format!("A{n}"), &summarizer)
                .await;
        }

        assert_eq!(state.buffer().len(), 6);
        assert!(summarizer.folded().is_empty());
        assert!(state.summary().is_empty());
    }
}
