//! Deterministic scripted backend.
//!
//! Replays a queue of canned replies or failures and records every request
//! it receives. Used by tests across the workspace.

use crate::backend::{LlmBackend, LlmRequest, LlmResponse, TokenUsage};
use crate::error::LlmError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Backend that replays a script of results.
#[derive(Debug)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Returned once the script is exhausted.
    otherwise: Result<String, LlmError>,
    requests: Mutex<Vec<LlmRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedBackend {
    /// Creates a backend with an empty script that fails once exhausted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            otherwise: Err(LlmError::RequestFailed {
                reason: "script exhausted".to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a backend that answers every request with `text`.
    #[must_use]
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            otherwise: Ok(text.into()),
            ..Self::new()
        }
    }

    /// Creates a backend that fails every request with `error`.
    #[must_use]
    pub fn failing(error: LlmError) -> Self {
        Self {
            otherwise: Err(error),
            ..Self::new()
        }
    }

    /// Queues a successful reply.
    #[must_use]
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        lock(&self.script).push_back(Ok(text.into()));
        self
    }

    /// Queues a failure.
    #[must_use]
    pub fn then_fail(self, error: LlmError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Returns a copy of every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<LlmRequest> {
        lock(&self.requests).clone()
    }

    /// Returns how many requests have been received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        lock(&self.requests).push(request.clone());
        let next = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.otherwise.clone());

        next.map(|content| LlmResponse {
            usage: TokenUsage {
                input_tokens: 0,
                output_tokens: content.split_whitespace().count() as u32,
            },
            content,
            model: request.model.clone(),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
