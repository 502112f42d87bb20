//! Core domain types and utilities for the rehearsal dialogue agent.
//!
//! This crate provides the identifier types and the error-handling
//! foundation shared by the AI and conversation crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ConversationId, ParseIdError, SessionId};
