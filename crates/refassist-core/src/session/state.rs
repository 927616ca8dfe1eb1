use serde::{Deserialize, Serialize};
use std::fmt;

/// The phase a conversation is currently in.
///
/// Exactly one variant is current per session. The variant is only a tag:
/// everything a phase needs (prompt, remote ids, pending error) lives in the
/// accompanying `SessionContext`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Waiting for the user's goal.
    #[default]
    StartOfConversation,
    /// Goal captured; the next utterance kicks off the first assessment.
    GenerateInitialPlan,
    /// The next utterance is a revision request for the current assessment.
    RevisePlan,
    /// A plan exists; utterances are follow-ups (questions or revisions).
    PlanGenerationFollowup,
    /// A remote call failed; the next utterance gets an apology and a reset.
    ConversationErrored,
    /// Guard state with no legal transition.
    ConversationNotStarted,
}

impl ConversationState {
    /// Whether this state can own an in-flight remote job worth cancelling.
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            Self::GenerateInitialPlan | Self::RevisePlan | Self::PlanGenerationFollowup
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::StartOfConversation => "StartOfConversation",
            Self::GenerateInitialPlan => "GenerateInitialPlan",
            Self::RevisePlan => "RevisePlan",
            Self::PlanGenerationFollowup => "PlanGenerationFollowup",
            Self::ConversationErrored => "ConversationErrored",
            Self::ConversationNotStarted => "ConversationNotStarted",
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
