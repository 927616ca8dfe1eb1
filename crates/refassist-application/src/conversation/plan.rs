//! `GenerateInitialPlan`, `RevisePlan` and the poll-to-artifact path they share.

use super::errored::route_to_errored;
use super::{InteractionScope, Transition, messages};
use refassist_core::session::{ConversationState, SessionContext};
use refassist_core::workflow::{AssessmentStatus, WorkflowStatus};
use refassist_core::workspace::ArtifactRequest;
use refassist_core::{RefAssistError, Result};
use refassist_remote::{PollOutcome, poll_assessment};
use uuid::Uuid;

pub(super) async fn generate_initial_plan(
    input: &str,
    context: SessionContext,
    scope: &InteractionScope<'_>,
) -> Transition {
    let messenger = scope.messenger;

    if scope.deps.workspace.is_empty().await {
        tracing::warn!(
            session_id = %context.session_id,
            "[Conversation] Workspace is empty, not starting an assessment"
        );
        return Transition::new(
            ConversationState::ConversationErrored,
            context.with_error(messages::EMPTY_WORKSPACE),
        );
    }

    messenger.send_answer(messages::CREATING_PLAN);
    let progress_id = Uuid::new_v4().to_string();
    messenger.send_initial_stream(&progress_id, messages::UPLOADING_WORKSPACE);

    match start_assessment(input, &context, scope).await {
        Ok(started) => execute_plan(started, scope, &progress_id).await,
        Err(err) => route_to_errored(context, messenger, "start_assessment", err),
    }
}

pub(super) async fn revise_plan(
    input: &str,
    context: SessionContext,
    scope: &InteractionScope<'_>,
) -> Transition {
    let messenger = scope.messenger;
    messenger.send_answer(messages::REVISING_PLAN);
    let progress_id = Uuid::new_v4().to_string();
    messenger.send_initial_stream(&progress_id, messages::STARTING_REVISION);

    let (engagement_id, assessment_id) = match remote_ids(&context) {
        Ok(ids) => ids,
        Err(err) => return route_to_errored(context, messenger, "revise_plan", err),
    };

    if let Err(err) = scope
        .client()
        .update_assessment(&engagement_id, &assessment_id, input.trim())
        .await
    {
        return route_to_errored(context, messenger, "update_assessment", err);
    }

    tracing::info!(
        session_id = %context.session_id,
        %engagement_id,
        %assessment_id,
        "[Conversation] Assessment revision started"
    );
    execute_plan(context, scope, &progress_id).await
}

/// Creates the engagement if needed, uploads the workspace and starts the job.
async fn start_assessment(
    input: &str,
    context: &SessionContext,
    scope: &InteractionScope<'_>,
) -> Result<SessionContext> {
    let client = scope.client();

    let engagement_id = match &context.engagement_id {
        Some(id) => id.clone(),
        None => client.create_engagement().await?.engagement_id,
    };

    client.upload_workspace_snapshot(&engagement_id).await?;

    let started = client
        .start_assessment(&engagement_id, &context.assessment_input(input))
        .await?;

    tracing::info!(
        session_id = %context.session_id,
        %engagement_id,
        assessment_id = %started.assessment_id,
        status = %started.status,
        "[Conversation] Assessment started"
    );

    Ok(context
        .clone()
        .with_engagement(engagement_id)
        .with_assessment(started.assessment_id))
}

/// Polls the current assessment to a terminal status and acts on it.
async fn execute_plan(
    context: SessionContext,
    scope: &InteractionScope<'_>,
    progress_id: &str,
) -> Transition {
    let messenger = scope.messenger;
    let (engagement_id, assessment_id) = match remote_ids(&context) {
        Ok(ids) => ids,
        Err(err) => return route_to_errored(context, messenger, "execute_plan", err),
    };

    messenger.update_placeholder(messages::GENERATING_PLAN_PLACEHOLDER);

    let outcome = poll_assessment(
        scope.client(),
        &scope.deps.poll_policy,
        scope.cancel,
        &engagement_id,
        &assessment_id,
        |status| report_progress(scope, progress_id, status),
    )
    .await;

    let status = match outcome {
        Ok(PollOutcome::Terminal(status)) => status,
        Ok(PollOutcome::Cancelled) => {
            return stop_cancelled_plan(context, scope, progress_id, &engagement_id, &assessment_id)
                .await;
        }
        Err(err) => return route_to_errored(context, messenger, "poll_assessment", err),
    };

    report_progress(scope, progress_id, &status);
    tracing::info!(
        session_id = %context.session_id,
        %assessment_id,
        status = %status.status,
        "[Conversation] Assessment finished"
    );

    match status.status {
        WorkflowStatus::Failed => {
            messenger.send_answer(messages::PLAN_FAILED);
            messenger.clear_placeholder();
            Transition::new(ConversationState::StartOfConversation, context)
        }
        WorkflowStatus::Cancelled => {
            messenger.send_answer(messages::PLAN_CANCELLED);
            messenger.clear_placeholder();
            Transition::new(ConversationState::StartOfConversation, context)
        }
        WorkflowStatus::Completed | WorkflowStatus::InProgress => {
            deliver_plan(context, scope, &engagement_id, &assessment_id).await
        }
    }
}

/// Downloads and stores the artifact, then presents it.
async fn deliver_plan(
    context: SessionContext,
    scope: &InteractionScope<'_>,
    engagement_id: &str,
    assessment_id: &str,
) -> Transition {
    let messenger = scope.messenger;

    let content = match scope
        .client()
        .download_artifact(engagement_id, assessment_id)
        .await
    {
        Ok(content) => content,
        Err(err) => return route_to_errored(context, messenger, "download_artifact", err),
    };

    let request = ArtifactRequest {
        session_id: context.session_id.clone(),
        assessment_id: assessment_id.to_string(),
        content: content.clone(),
    };
    let locator = match scope.deps.artifacts.store_artifact(request).await {
        Ok(locator) => locator,
        Err(err) => return route_to_errored(context, messenger, "store_artifact", err),
    };

    messenger.send_votable_answer(content);
    messenger.send_answer_with_follow_up(
        messages::plan_ready(&locator),
        messages::plan_follow_ups(),
    );
    messenger.clear_placeholder();

    Transition::new(ConversationState::PlanGenerationFollowup, context)
}

/// The user cancelled: ask the remote to stop, swallow any failure, restart.
async fn stop_cancelled_plan(
    context: SessionContext,
    scope: &InteractionScope<'_>,
    progress_id: &str,
    engagement_id: &str,
    assessment_id: &str,
) -> Transition {
    let messenger = scope.messenger;
    messenger.update_answer(progress_id, messages::CANCELLING_PLAN);

    match scope
        .client()
        .stop_assessment(engagement_id, assessment_id)
        .await
    {
        Ok(status) => tracing::info!(
            session_id = %context.session_id,
            assessment_id,
            %status,
            "[Conversation] Assessment stopped"
        ),
        Err(err) => tracing::warn!(
            session_id = %context.session_id,
            assessment_id,
            error = %err,
            "[Conversation] Failed to stop assessment, ignoring"
        ),
    }

    messenger.send_answer(messages::PLAN_CANCELLED);
    messenger.clear_placeholder();
    Transition::new(ConversationState::StartOfConversation, context)
}

fn report_progress(scope: &InteractionScope<'_>, progress_id: &str, status: &AssessmentStatus) {
    if !status.status_detail.is_empty() {
        scope
            .messenger
            .update_answer(progress_id, status.status_detail.as_str());
    }
}

fn remote_ids(context: &SessionContext) -> Result<(String, String)> {
    match (&context.engagement_id, &context.assessment_id) {
        (Some(engagement_id), Some(assessment_id)) => {
            Ok((engagement_id.clone(), assessment_id.clone()))
        }
        _ => Err(RefAssistError::illegal_state(format!(
            "session '{}' has no assessment to work on",
            context.session_id
        ))),
    }
}
