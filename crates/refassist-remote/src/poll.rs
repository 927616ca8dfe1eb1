//! Poll-until-terminal primitive shared by every state that waits on the server.

use crate::client::RemoteWorkflowClient;
use refassist_core::config::PollingConfig;
use refassist_core::workflow::{AssessmentStatus, InteractionStatus};
use refassist_core::{RefAssistError, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Fixed-delay polling with a flat consecutive-error cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before every fetch, including the first.
    pub interval: Duration,
    /// Failures in a row tolerated before giving up.
    pub max_consecutive_errors: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            max_consecutive_errors: config.max_consecutive_errors,
        }
    }
}

/// How a poll loop ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The fetch returned a terminal value.
    Terminal(T),
    /// The cancellation token fired before a terminal value was seen.
    Cancelled,
}

impl<T> PollOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Repeats `fetch` until `is_terminal` accepts its result.
///
/// The delay comes before each fetch. `cancel` is checked before every fetch
/// and also cuts the delay short, so a cancelled loop never issues another
/// request. A successful fetch resets the error count; reaching
/// `max_consecutive_errors` failures in a row yields `PollExhausted`.
/// `on_progress` sees every non-terminal result.
pub async fn poll_until_terminal<T, F, Fut, P, G>(
    policy: &PollPolicy,
    cancel: &CancellationToken,
    mut fetch: F,
    is_terminal: P,
    mut on_progress: G,
) -> Result<PollOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
    G: FnMut(&T),
{
    let mut consecutive_errors = 0u32;
    let mut attempt = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(attempt, "[poll] Cancelled while waiting");
                return Ok(PollOutcome::Cancelled);
            }
            _ = tokio::time::sleep(policy.interval) => {}
        }

        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }

        attempt += 1;
        match fetch().await {
            Ok(value) => {
                consecutive_errors = 0;
                if is_terminal(&value) {
                    tracing::debug!(attempt, "[poll] Reached terminal status");
                    return Ok(PollOutcome::Terminal(value));
                }
                on_progress(&value);
            }
            Err(err) => {
                consecutive_errors += 1;
                tracing::warn!(
                    attempt,
                    consecutive_errors,
                    error = %err,
                    "[poll] Fetch failed"
                );
                if consecutive_errors >= policy.max_consecutive_errors {
                    return Err(RefAssistError::poll_exhausted(consecutive_errors, err));
                }
            }
        }
    }
}

/// Polls an assessment until it is COMPLETED, FAILED or CANCELLED.
pub async fn poll_assessment<G>(
    client: &dyn RemoteWorkflowClient,
    policy: &PollPolicy,
    cancel: &CancellationToken,
    engagement_id: &str,
    assessment_id: &str,
    on_progress: G,
) -> Result<PollOutcome<AssessmentStatus>>
where
    G: FnMut(&AssessmentStatus),
{
    poll_until_terminal(
        policy,
        cancel,
        || client.get_assessment_status(engagement_id, assessment_id),
        AssessmentStatus::is_terminal,
        on_progress,
    )
    .await
}

/// Polls a follow-up interaction until it reaches a terminal status.
pub async fn poll_interaction<G>(
    client: &dyn RemoteWorkflowClient,
    policy: &PollPolicy,
    cancel: &CancellationToken,
    engagement_id: &str,
    interaction_id: &str,
    on_progress: G,
) -> Result<PollOutcome<InteractionStatus>>
where
    G: FnMut(&InteractionStatus),
{
    poll_until_terminal(
        policy,
        cancel,
        || client.get_interaction_status(engagement_id, interaction_id),
        InteractionStatus::is_terminal,
        on_progress,
    )
    .await
}
