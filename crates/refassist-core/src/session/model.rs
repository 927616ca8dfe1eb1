use super::context::SessionContext;
use super::state::ConversationState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The conversation-scoped aggregate owned by exactly one supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    pub state: ConversationState,
    pub context: SessionContext,
    /// Set while the user must re-authenticate before sending again.
    pub is_authenticating: bool,
}

impl ConversationSession {
    /// Creates a session at `StartOfConversation`.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            state: ConversationState::StartOfConversation,
            context: SessionContext::new(session_id),
            is_authenticating: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.context.session_id
    }

    /// Builds the replayable view of this session.
    pub fn snapshot(&self, busy: bool) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.context.session_id.clone(),
            state: self.state,
            trace_id: self.context.trace_id,
            started_at: self.context.started_at,
            engagement_id: self.context.engagement_id.clone(),
            assessment_id: self.context.assessment_id.clone(),
            interaction_id: self.context.interaction_id.clone(),
            busy,
            is_authenticating: self.is_authenticating,
        }
    }
}

/// Point-in-time view of a session, used to replay the in-progress state into
/// another tab or a reconnecting client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: ConversationState,
    pub trace_id: u64,
    pub started_at: DateTime<Utc>,
    pub engagement_id: Option<String>,
    pub assessment_id: Option<String>,
    pub interaction_id: Option<String>,
    /// True while an interaction is running against the session.
    pub busy: bool,
    pub is_authenticating: bool,
}
