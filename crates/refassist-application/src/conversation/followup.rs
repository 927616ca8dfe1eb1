//! `PlanGenerationFollowup`: questions, revision requests and restarts once a plan exists.

use super::errored::route_to_errored;
use super::{InteractionScope, Transition, messages};
use refassist_core::RefAssistError;
use refassist_core::session::{ConversationState, SessionContext};
use refassist_core::workflow::{UserIntent, WorkflowStatus};
use refassist_remote::{PollOutcome, poll_interaction};
use uuid::Uuid;

pub(super) async fn interact(
    input: &str,
    context: SessionContext,
    scope: &InteractionScope<'_>,
) -> Transition {
    let messenger = scope.messenger;

    let Some(engagement_id) = context.engagement_id.clone() else {
        let err = RefAssistError::illegal_state(format!(
            "session '{}' has no engagement to follow up on",
            context.session_id
        ));
        return route_to_errored(context, messenger, "derive_user_intent", err);
    };

    let intent = match scope
        .client()
        .derive_user_intent(&engagement_id, input.trim())
        .await
    {
        Ok(intent) => intent,
        Err(err) => return route_to_errored(context, messenger, "derive_user_intent", err),
    };

    tracing::debug!(
        session_id = %context.session_id,
        ?intent,
        "[Conversation] Follow-up classified"
    );

    match intent {
        UserIntent::QuestionAndAnswer => {
            answer_question(input, &engagement_id, context, scope).await
        }
        UserIntent::Assessment => {
            messenger.send_answer_with_follow_up(
                messages::REVISION_PROMPT,
                messages::revision_follow_ups(),
            );
            Transition::new(ConversationState::RevisePlan, context)
        }
        UserIntent::NewAssessment => {
            messenger.send_answer_with_follow_up(
                messages::CLARIFYING_PROMPT,
                messages::clarifying_follow_ups(),
            );
            Transition::new(
                ConversationState::GenerateInitialPlan,
                context.with_prompt(input.trim()),
            )
        }
        UserIntent::Default => {
            messenger.send_answer_with_follow_up(
                messages::did_not_understand(),
                messages::plan_follow_ups(),
            );
            Transition::new(ConversationState::PlanGenerationFollowup, context)
        }
    }
}

/// Runs one remote question/answer exchange and stays in the follow-up state.
async fn answer_question(
    input: &str,
    engagement_id: &str,
    context: SessionContext,
    scope: &InteractionScope<'_>,
) -> Transition {
    let messenger = scope.messenger;
    let progress_id = Uuid::new_v4().to_string();
    messenger.send_initial_stream(&progress_id, messages::GENERATING_RESPONSE);
    messenger.update_placeholder(messages::GENERATING_RESPONSE_PLACEHOLDER);

    let started = match scope
        .client()
        .start_interaction(engagement_id, input.trim())
        .await
    {
        Ok(started) => started,
        Err(err) => return route_to_errored(context, messenger, "start_interaction", err),
    };
    let context = context.with_interaction(started.interaction_id.clone());

    let outcome = poll_interaction(
        scope.client(),
        &scope.deps.poll_policy,
        scope.cancel,
        engagement_id,
        &started.interaction_id,
        |status| messenger.update_answer(&progress_id, status.status.as_str()),
    )
    .await;

    let status = match outcome {
        Ok(PollOutcome::Terminal(status)) => status,
        Ok(PollOutcome::Cancelled) => {
            tracing::info!(
                session_id = %context.session_id,
                interaction_id = %started.interaction_id,
                "[Conversation] Interaction cancelled by user"
            );
            messenger.update_answer(&progress_id, messages::RESPONSE_CANCELLED);
            messenger.clear_placeholder();
            return Transition::new(ConversationState::PlanGenerationFollowup, context);
        }
        Err(err) => return route_to_errored(context, messenger, "poll_interaction", err),
    };

    match status.status {
        WorkflowStatus::Completed | WorkflowStatus::InProgress => {
            messenger.send_votable_answer(status.response_text);
            messenger.send_answer_with_follow_up(
                messages::another_follow_up(),
                messages::plan_follow_ups(),
            );
        }
        WorkflowStatus::Failed => messenger.send_answer(messages::RESPONSE_FAILED),
        WorkflowStatus::Cancelled => messenger.send_answer(messages::RESPONSE_CANCELLED),
    }
    messenger.clear_placeholder();

    Transition::new(ConversationState::PlanGenerationFollowup, context)
}
