//! Console configuration.
//!
//! Loaded via the `config` crate from `REHEARSAL_`-prefixed environment
//! variables, with `__` separating nested keys, e.g.
//! `REHEARSAL_LLM__API_KEY` or `REHEARSAL_DIALOGUE__WINDOW__MAX_WINDOW`.

use rehearsal_ai::LlmBackendConfig;
use rehearsal_conversation::DialogueConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Console configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// Remote backend settings.
    #[serde(default)]
    pub llm: LlmBackendConfig,

    /// Window, budgets, model and persona.
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Directory holding the per-conversation JSON logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Conversation id used for the console session.
    #[serde(default = "default_conversation_id")]
    pub conversation_id: i64,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("chats")
}

fn default_conversation_id() -> i64 {
    1
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(None)
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_source(
        vars: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("REHEARSAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.llm.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(config::ConfigError::Message(
                "llm.api_key is required (REHEARSAL_LLM__API_KEY)".to_string(),
            ));
        }
        if self.dialogue.window.max_window == 0 {
            return Err(config::ConfigError::Message(
                "dialogue.window.max_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
