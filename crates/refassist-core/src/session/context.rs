//! Per-transition session data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Data carried alongside the current `ConversationState`.
///
/// A `SessionContext` is never mutated in place by the state machine: every
/// transition consumes the old value and produces a new one, so the
/// supervisor can swap `(state, context)` as a single write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// External session (tab) identifier.
    pub session_id: String,
    /// Monotonic trace identifier, incremented on every restart.
    pub trace_id: u64,
    /// When the current trace started.
    pub started_at: DateTime<Utc>,
    /// Goal captured at the start of the conversation.
    pub prompt: Option<String>,
    pub engagement_id: Option<String>,
    pub assessment_id: Option<String>,
    pub interaction_id: Option<String>,
    /// User-facing message to show on the next errored interaction.
    pub error: Option<String>,
}

impl SessionContext {
    /// Creates an empty context for a new conversation.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: 1,
            started_at: Utc::now(),
            prompt: None,
            engagement_id: None,
            assessment_id: None,
            interaction_id: None,
            error: None,
        }
    }

    pub fn with_prompt(self, prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..self
        }
    }

    /// Forgets the captured goal but keeps the remote identifiers.
    pub fn without_prompt(self) -> Self {
        Self {
            prompt: None,
            ..self
        }
    }

    pub fn with_engagement(self, engagement_id: impl Into<String>) -> Self {
        Self {
            engagement_id: Some(engagement_id.into()),
            ..self
        }
    }

    /// Records a new assessment. Any previous interaction belonged to the old
    /// assessment and is dropped.
    pub fn with_assessment(self, assessment_id: impl Into<String>) -> Self {
        Self {
            assessment_id: Some(assessment_id.into()),
            interaction_id: None,
            ..self
        }
    }

    pub fn with_interaction(self, interaction_id: impl Into<String>) -> Self {
        Self {
            interaction_id: Some(interaction_id.into()),
            ..self
        }
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..self
        }
    }

    /// Starts a fresh trace for the same session.
    ///
    /// Remote identifiers and the captured prompt are discarded so that the
    /// next assessment runs against a brand new engagement.
    pub fn restarted(self) -> Self {
        Self {
            session_id: self.session_id,
            trace_id: self.trace_id + 1,
            started_at: Utc::now(),
            prompt: None,
            engagement_id: None,
            assessment_id: None,
            interaction_id: None,
            error: None,
        }
    }

    /// The prompt text to send when starting an assessment.
    pub fn assessment_input(&self, user_input: &str) -> String {
        match self.prompt.as_deref().map(str::trim) {
            Some(prompt) if !prompt.is_empty() => format!("{} {}", prompt, user_input.trim()),
            _ => user_input.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_clears_remote_identifiers_and_bumps_trace() {
        let ctx = SessionContext::new("tab-1")
            .with_prompt("refactor my monolith")
            .with_engagement("E1")
            .with_assessment("A1")
            .with_interaction("I1")
            .with_error("boom");

        let restarted = ctx.clone().restarted();

        assert_eq!(restarted.session_id, "tab-1");
        assert_eq!(restarted.trace_id, ctx.trace_id + 1);
        assert_eq!(restarted.engagement_id, None);
        assert_eq!(restarted.assessment_id, None);
        assert_eq!(restarted.interaction_id, None);
        assert_eq!(restarted.prompt, None);
        assert_eq!(restarted.error, None);
    }

    #[test]
    fn new_assessment_drops_previous_interaction() {
        let ctx = SessionContext::new("tab-1")
            .with_assessment("A1")
            .with_interaction("I1")
            .with_assessment("A2");

        assert_eq!(ctx.assessment_id.as_deref(), Some("A2"));
        assert_eq!(ctx.interaction_id, None);
    }

    #[test]
    fn assessment_input_joins_prompt_and_input() {
        let ctx = SessionContext::new("tab-1").with_prompt("refactor my monolith");
        assert_eq!(
            ctx.assessment_input("focus on the cart"),
            "refactor my monolith focus on the cart"
        );

        let bare = SessionContext::new("tab-1");
        assert_eq!(bare.assessment_input(" just go "), "just go");
    }
}
