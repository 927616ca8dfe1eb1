//! Session domain module.
//!
//! This module contains the conversation-scoped aggregate and the values the
//! state machine threads through every transition.
//!
//! # Module Structure
//!
//! - `state`: Conversation phase tag (`ConversationState`)
//! - `context`: Immutable per-transition data (`SessionContext`)
//! - `model`: Conversation aggregate (`ConversationSession`) and its replayable
//!   view (`SessionSnapshot`)

mod context;
mod model;
mod state;

pub use context::SessionContext;
pub use model::{ConversationSession, SessionSnapshot};
pub use state::ConversationState;
