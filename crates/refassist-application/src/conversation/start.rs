use super::{InteractionScope, Transition, messages};
use refassist_core::session::{ConversationState, SessionContext};

/// Captures the user's goal and asks for any further requirements.
pub(super) fn interact(
    input: &str,
    context: SessionContext,
    scope: &InteractionScope<'_>,
) -> Transition {
    scope.messenger.send_answer_with_follow_up(
        messages::CLARIFYING_PROMPT,
        messages::clarifying_follow_ups(),
    );

    Transition::new(
        ConversationState::GenerateInitialPlan,
        context.with_prompt(input.trim()),
    )
}
