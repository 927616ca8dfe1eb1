//! Domain layer for the Refactor Assistant.
//!
//! Holds the vocabulary shared by every other crate: the error type, the
//! remote workflow model, the session aggregate, UI events and the traits for
//! the collaborators the conversation calls out to.

pub mod auth;
pub mod config;
pub mod error;
pub mod event;
pub mod messenger;
pub mod session;
pub mod workflow;
pub mod workspace;

// Re-export common error type
pub use error::{RefAssistError, Result};
