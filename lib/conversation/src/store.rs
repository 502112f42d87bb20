//! Live conversation state keyed by conversation id.
//!
//! State is created only on explicit session start or reset, never
//! implicitly on first message. Each entry sits behind its own async mutex:
//! a turn holds it for the whole step, including remote calls, so turns for
//! one conversation run one at a time while different conversations proceed
//! in parallel.

use crate::window::ConversationState;
use rehearsal_core::ConversationId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

/// Shared handle to one conversation's state.
pub type ConversationHandle = Arc<Mutex<ConversationState>>;

/// In-process store of live conversation state.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<ConversationId, ConversationHandle>>,
}

impl ConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ConversationId, ConversationHandle>> {
        self.conversations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ConversationId, ConversationHandle>> {
        self.conversations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Installs fresh state, replacing any existing state wholesale.
    ///
    /// A turn already holding the previous handle finishes against the
    /// discarded state.
    pub fn install(
        &self,
        conversation_id: ConversationId,
        state: ConversationState,
    ) -> ConversationHandle {
        let handle = Arc::new(Mutex::new(state));
        self.write().insert(conversation_id, handle.clone());
        handle
    }

    /// Returns the handle for a conversation, if a session was started.
    #[must_use]
    pub fn get(&self, conversation_id: ConversationId) -> Option<ConversationHandle> {
        self.read().get(&conversation_id).cloned()
    }

    /// Returns true if the conversation has live state.
    #[must_use]
    pub fn contains(&self, conversation_id: ConversationId) -> bool {
        self.read().contains_key(&conversation_id)
    }

    /// Returns the number of live conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no conversation has live state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
