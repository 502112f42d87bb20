//! Append-only message log.
//!
//! Every event of a conversation is recorded here for audit and reporting.
//! Entries are never rewritten or removed, and the live context window is
//! never rebuilt from the log.

use crate::error::LogError;
use crate::message::LogEntry;
use async_trait::async_trait;
use rehearsal_core::ConversationId;
use rootcause::prelude::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Trait for the per-conversation message log.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Appends one entry to the conversation's log.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be persisted.
    async fn append(
        &self,
        conversation_id: ConversationId,
        entry: LogEntry,
    ) -> rehearsal_core::Result<(), LogError>;

    /// Loads every entry of the conversation in write order.
    ///
    /// A conversation that was never written to has an empty log.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored log cannot be read.
    async fn load_all(
        &self,
        conversation_id: ConversationId,
    ) -> rehearsal_core::Result<Vec<LogEntry>, LogError>;
}

/// On-disk shape of one conversation's log.
#[derive(Debug, Serialize, Deserialize)]
struct ChatDocument {
    chat_id: ConversationId,
    messages: Vec<LogEntry>,
}

/// Log store keeping one pretty-printed JSON document per conversation.
#[derive(Debug)]
pub struct JsonFileLog {
    dir: PathBuf,
    /// Serialises read-modify-write cycles per conversation.
    write_locks: Mutex<HashMap<ConversationId, Arc<tokio::sync::Mutex<()>>>>,
}

impl JsonFileLog {
    /// Creates a log store rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the document path for a conversation.
    #[must_use]
    pub fn path_for(&self, conversation_id: ConversationId) -> PathBuf {
        self.dir.join(format!("chat_{conversation_id}.json"))
    }

    fn write_lock(&self, conversation_id: ConversationId) -> Arc<tokio::sync::Mutex<()>> {
        lock(&self.write_locks)
            .entry(conversation_id)
            .or_default()
            .clone()
    }

    async fn read_document(
        path: &Path,
        conversation_id: ConversationId,
    ) -> rehearsal_core::Result<ChatDocument, LogError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ChatDocument {
                    chat_id: conversation_id,
                    messages: Vec::new(),
                });
            }
            Err(e) => {
                return Err(Report::new(e).context(LogError::Io {
                    path: path.display().to_string(),
                }));
            }
        };

        serde_json::from_slice(&bytes).context(LogError::Corrupt {
            path: path.display().to_string(),
        })
    }
}

#[async_trait]
impl MessageLog for JsonFileLog {
    async fn append(
        &self,
        conversation_id: ConversationId,
        entry: LogEntry,
    ) -> rehearsal_core::Result<(), LogError> {
        let write_lock = self.write_lock(conversation_id);
        let _guard = write_lock.lock().await;
        let path = self.path_for(conversation_id);
        let io_error = || LogError::Io {
            path: path.display().to_string(),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .context_with(io_error)?;

        let mut document = Self::read_document(&path, conversation_id).await?;
        document.messages.push(entry);

        let bytes = serde_json::to_vec_pretty(&document).context(LogError::SerializeFailed)?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, bytes)
            .await
            .context_with(io_error)?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .context_with(io_error)?;

        debug!(
            conversation_id = %conversation_id,
            entries = document.messages.len(),
            "Appended log entry"
        );
        Ok(())
    }

    async fn load_all(
        &self,
        conversation_id: ConversationId,
    ) -> rehearsal_core::Result<Vec<LogEntry>, LogError> {
        let path = self.path_for(conversation_id);
        Ok(Self::read_document(&path, conversation_id).await?.messages)
    }
}

/// In-memory log store.
///
/// Can be switched into a failing mode to exercise the
/// availability-over-durability path.
#[derive(Debug, Default)]
pub struct InMemoryLog {
    entries: Mutex<HashMap<ConversationId, Vec<LogEntry>>>,
    fail_writes: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryLog {
    /// Creates an empty in-memory log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log whose appends always fail.
    #[must_use]
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Returns a snapshot of a conversation's entries.
    #[must_use]
    pub fn snapshot(&self, conversation_id: ConversationId) -> Vec<LogEntry> {
        lock(&self.entries)
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessageLog for InMemoryLog {
    async fn append(
        &self,
        conversation_id: ConversationId,
        entry: LogEntry,
    ) -> rehearsal_core::Result<(), LogError> {
        if self.fail_writes {
            return Err(LogError::StorageFailed {
                reason: "writes disabled".to_string(),
            }
            .into());
        }
        lock(&self.entries)
            .entry(conversation_id)
            .or_default()
            .push(entry);
        Ok(())
    }

    async fn load_all(
        &self,
        conversation_id: ConversationId,
    ) -> rehearsal_core::Result<Vec<LogEntry>, LogError> {
        Ok(self.snapshot(conversation_id))
    }
}
