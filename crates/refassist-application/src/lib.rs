//! Application layer for the Refactor Assistant.
//!
//! This crate runs conversations: the state machine that drives the remote
//! assessment workflow, the per-session actor that serializes interactions,
//! and the registry and controller that route chat commands to sessions.

pub mod controller;
pub mod conversation;
pub mod session;

#[cfg(test)]
mod testing;

pub use controller::ChatController;
pub use conversation::{ConversationDeps, Transition};
pub use session::{InteractionHandle, SessionFactory, SessionRegistry, SessionSupervisor};
