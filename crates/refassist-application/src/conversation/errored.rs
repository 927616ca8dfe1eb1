use super::{InteractionScope, Transition, messages};
use refassist_core::RefAssistError;
use refassist_core::messenger::SessionMessenger;
use refassist_core::session::{ConversationState, SessionContext};

/// Apologises and restarts the conversation with fresh identifiers.
pub(super) fn interact(context: SessionContext, scope: &InteractionScope<'_>) -> Transition {
    let message = context
        .error
        .clone()
        .unwrap_or_else(|| messages::GENERIC_APOLOGY.to_string());
    scope.messenger.send_answer(message);

    tracing::info!(
        session_id = %context.session_id,
        trace_id = context.trace_id,
        "[Conversation] Restarting after error"
    );
    Transition::new(ConversationState::StartOfConversation, context.restarted())
}

/// Routes a failed step to `ConversationErrored`.
///
/// The cause is logged; the user only ever sees the generic apology on the
/// next interaction.
pub(super) fn route_to_errored(
    context: SessionContext,
    messenger: &SessionMessenger,
    step: &'static str,
    err: RefAssistError,
) -> Transition {
    tracing::error!(
        session_id = %context.session_id,
        step,
        remote = err.is_remote(),
        error = %err,
        "[Conversation] Step failed, routing to ConversationErrored"
    );
    messenger.clear_placeholder();
    Transition::new(ConversationState::ConversationErrored, context)
}
