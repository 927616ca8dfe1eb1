//! Conversation state machine.
//!
//! [`interact`] is the single dispatch table: it takes the current
//! `ConversationState`, the user's utterance and the current
//! `SessionContext`, performs whatever remote work the state calls for and
//! returns the next `(state, context)` pair. Nothing here stores state; the
//! supervisor owns the session and swaps in the returned [`Transition`].
//!
//! # Module Structure
//!
//! - `start`: `StartOfConversation`
//! - `plan`: `GenerateInitialPlan`, `RevisePlan` and the shared plan execution
//! - `followup`: `PlanGenerationFollowup`
//! - `errored`: `ConversationErrored` and the route into it
//! - `help`: help requests, which reset to `StartOfConversation`
//! - `messages`: user-facing text

mod errored;
mod followup;
mod help;
pub mod messages;
mod plan;
mod start;

use refassist_core::messenger::SessionMessenger;
use refassist_core::session::{ConversationState, SessionContext};
use refassist_core::workspace::{ArtifactStore, Workspace};
use refassist_core::{RefAssistError, Result};
use refassist_remote::{PollPolicy, RemoteWorkflowClient};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The outcome of one interaction: the state and context to store next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ConversationState,
    pub context: SessionContext,
}

impl Transition {
    pub fn new(state: ConversationState, context: SessionContext) -> Self {
        Self { state, context }
    }
}

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct ConversationDeps {
    pub client: Arc<dyn RemoteWorkflowClient>,
    pub workspace: Arc<dyn Workspace>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub poll_policy: PollPolicy,
}

/// What one interaction runs with: shared collaborators, the session's
/// messenger and the cancellation token for this interaction only.
pub struct InteractionScope<'a> {
    pub deps: &'a ConversationDeps,
    pub messenger: &'a SessionMessenger,
    pub cancel: &'a CancellationToken,
}

impl InteractionScope<'_> {
    fn client(&self) -> &dyn RemoteWorkflowClient {
        self.deps.client.as_ref()
    }
}

/// Feeds `input` to `state` and returns the next transition.
///
/// Remote failures never surface as `Err`: they are logged and turned into a
/// transition to `ConversationErrored`. The only error is `IllegalState`
/// from `ConversationNotStarted`, which has no legal transition.
pub async fn interact(
    state: ConversationState,
    input: &str,
    context: SessionContext,
    scope: &InteractionScope<'_>,
) -> Result<Transition> {
    match state {
        ConversationState::StartOfConversation => Ok(start::interact(input, context, scope)),
        ConversationState::GenerateInitialPlan => {
            Ok(plan::generate_initial_plan(input, context, scope).await)
        }
        ConversationState::RevisePlan => Ok(plan::revise_plan(input, context, scope).await),
        ConversationState::PlanGenerationFollowup => {
            Ok(followup::interact(input, context, scope).await)
        }
        ConversationState::ConversationErrored => Ok(errored::interact(context, scope)),
        ConversationState::ConversationNotStarted => Err(RefAssistError::illegal_state(format!(
            "{} accepts no interaction (session '{}')",
            state, context.session_id
        ))),
    }
}

/// Answers a help request from any state and returns to `StartOfConversation`.
///
/// Remote identifiers are kept, so a plan created earlier can still be
/// downloaded; only the captured goal is dropped.
pub fn help(context: SessionContext, scope: &InteractionScope<'_>) -> Transition {
    help::interact(context, scope)
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
