//! Message vocabulary exchanged with the presentation layer.
//!
//! `UiCommand` is what the chat surface sends in; `UiEvent` is what the
//! conversation emits back out through a `Messenger`. Both serialize as
//! `{ "type": ..., "sessionId": ..., ... }`.

use crate::auth::AuthFollowUpType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A suggested follow-up the user can click instead of typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpOption {
    pub pill_text: String,
    pub prompt: String,
}

impl FollowUpOption {
    pub fn new(pill_text: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            pill_text: pill_text.into(),
            prompt: prompt.into(),
        }
    }

    /// A pill whose label is also the prompt it sends.
    pub fn echo(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            pill_text: text.clone(),
            prompt: text,
        }
    }
}

/// A group of follow-up suggestions attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub text: String,
    pub options: Vec<FollowUpOption>,
}

impl FollowUp {
    pub fn examples(options: Vec<FollowUpOption>) -> Self {
        Self {
            text: "Try Examples:".to_string(),
            options,
        }
    }
}

/// Events emitted to the presentation layer. Never awaited by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiEvent {
    /// A complete chat answer.
    Answer {
        session_id: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        follow_up: Option<FollowUp>,
        #[serde(default)]
        can_be_voted: bool,
    },
    /// Creates or replaces the streaming message identified by `message_id`.
    AnswerStream {
        session_id: String,
        message_id: String,
        message: String,
    },
    /// Replaces the chat input placeholder; empty clears it.
    PlaceholderUpdate {
        session_id: String,
        placeholder: String,
    },
    /// The user must (re-)authenticate before continuing.
    AuthNeeded {
        session_id: String,
        auth_type: AuthFollowUpType,
        message: String,
    },
    /// Enables or disables the chat input.
    InputEnabled { session_id: String, enabled: bool },
}

impl UiEvent {
    pub fn session_id(&self) -> &str {
        match self {
            Self::Answer { session_id, .. }
            | Self::AnswerStream { session_id, .. }
            | Self::PlaceholderUpdate { session_id, .. }
            | Self::AuthNeeded { session_id, .. }
            | Self::InputEnabled { session_id, .. } => session_id,
        }
    }
}

/// Commands arriving from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiCommand {
    ChatMessage { session_id: String, message: String },
    StopResponse { session_id: String },
    TabClosed { session_id: String },
    /// Authentication changed for the whole client; fanned out to every session.
    AuthChanged {
        #[serde(default)]
        session_id: Option<String>,
        authenticated: bool,
    },
    FollowUpClicked {
        session_id: String,
        follow_up: FollowUpOption,
    },
    /// Shows what the assistant can do and returns the session to its start.
    Help { session_id: String },
    /// Downloads the session's current plan again and saves it to
    /// `destination`, or under the plan's default file name when absent.
    DownloadPlan {
        session_id: String,
        #[serde(default)]
        destination: Option<PathBuf>,
    },
    /// The user picked the sign-in pill of an `authNeeded` event.
    AuthFollowUpClicked {
        session_id: String,
        auth_type: AuthFollowUpType,
    },
}
