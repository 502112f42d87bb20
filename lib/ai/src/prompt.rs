//! Prompt templates.
//!
//! Templates are plain text with `{{variable}}` placeholders. Declared
//! variables are required; rendering fails if one is not supplied.

use crate::error::PromptError;
use std::collections::HashMap;

/// A named prompt template with an optional system instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Template name (used in errors and logs).
    pub name: String,
    /// Template content with placeholders.
    pub content: String,
    /// System instruction sent alongside the rendered prompt.
    pub system_prompt: Option<String>,
    /// Variables that must be supplied when rendering.
    pub variables: Vec<String>,
}

impl PromptTemplate {
    /// Creates a new prompt template.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            system_prompt: None,
            variables: Vec::new(),
        }
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Declares a required variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variables.push(name.into());
        self
    }

    /// Renders the template with the given variables.
    ///
    /// Substitution is single-pass, so placeholder-looking text inside a
    /// supplied value is never expanded.
    ///
    /// # Errors
    ///
    /// Returns `MissingVariable` if a declared variable is not supplied.
    pub fn render(&self, variables: &HashMap<&str, &str>) -> Result<String, PromptError> {
        if let Some(missing) = self
            .variables
            .iter()
            .find(|name| !variables.contains_key(name.as_str()))
        {
            return Err(PromptError::MissingVariable {
                template: self.name.clone(),
                variable: missing.clone(),
            });
        }

        let mut result = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();
        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let name = after[..end].trim();
                    match variables.get(name) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);

        Ok(result)
    }
}
