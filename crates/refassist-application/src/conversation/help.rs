use super::{InteractionScope, Transition, messages};
use refassist_core::session::{ConversationState, SessionContext};

pub(super) fn interact(context: SessionContext, scope: &InteractionScope<'_>) -> Transition {
    scope
        .messenger
        .send_answer_with_follow_up(messages::HELP, messages::help_follow_ups());
    Transition::new(ConversationState::StartOfConversation, context.without_prompt())
}
