//! Outbound request assembly.
//!
//! The model always sees, in this order: the persona, the condensed prior
//! context (only when a summary exists), then the live buffer verbatim.

use crate::window::ConversationState;
use rehearsal_ai::LlmMessage;

/// Label wrapped around the running summary.
pub const SUMMARY_LABEL: &str = "Condensed prior context: ";

/// Builds the ordered role/text sequence for the next model call.
#[must_use]
pub fn build_request(state: &ConversationState) -> Vec<LlmMessage> {
    let mut messages = Vec::with_capacity(state.buffer().len() + 2);
    messages.push(LlmMessage::system(state.persona()));
    if !state.summary().is_empty() {
        messages.push(LlmMessage::system(format!(
            "{SUMMARY_LABEL}{}",
            state.summary()
        )));
    }
    messages.extend(state.buffer().iter().map(|turn| turn.to_llm_message()));
    messages
}
