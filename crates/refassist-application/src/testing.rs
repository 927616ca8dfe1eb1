//! Hand-written doubles for the conversation's collaborators.

use crate::conversation::ConversationDeps;
use async_trait::async_trait;
use refassist_core::event::UiEvent;
use refassist_core::messenger::Messenger;
use refassist_core::workflow::{
    AssessmentStatus, Engagement, InteractionStatus, StartedAssessment, StartedInteraction,
    UserIntent, WorkflowStatus,
};
use refassist_core::workspace::{ArtifactLocator, ArtifactRequest, ArtifactStore, Workspace};
use refassist_core::{RefAssistError, Result};
use refassist_remote::{PollPolicy, RemoteWorkflowClient};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) fn fast_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_consecutive_errors: 3,
    }
}

pub(crate) fn unavailable(endpoint: &str) -> RefAssistError {
    RefAssistError::remote_call(endpoint, "HTTP 503: upstream unavailable")
}

/// Scripted remote. Every call is recorded as `operation:arg:arg`.
pub(crate) struct MockClient {
    calls: Mutex<Vec<String>>,
    engagements: Mutex<u32>,
    assessments: Mutex<u32>,
    interactions: Mutex<u32>,
    assessment_statuses: Mutex<VecDeque<Result<AssessmentStatus>>>,
    interaction_statuses: Mutex<VecDeque<Result<InteractionStatus>>>,
    intent: Mutex<Result<UserIntent>>,
    upload_error: Mutex<Option<RefAssistError>>,
    stop_error: Mutex<Option<RefAssistError>>,
    status_delay: Mutex<Duration>,
    cancel_on_status: Mutex<Option<CancellationToken>>,
    artifact: String,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            engagements: Mutex::new(0),
            assessments: Mutex::new(0),
            interactions: Mutex::new(0),
            assessment_statuses: Mutex::new(VecDeque::new()),
            interaction_statuses: Mutex::new(VecDeque::new()),
            intent: Mutex::new(Ok(UserIntent::Default)),
            upload_error: Mutex::new(None),
            stop_error: Mutex::new(None),
            status_delay: Mutex::new(Duration::ZERO),
            cancel_on_status: Mutex::new(None),
            artifact: "# Plan".to_string(),
        }
    }

    /// Assessment poll responses, in order. Once drained, polls report COMPLETED.
    pub(crate) fn with_assessment_statuses(self, statuses: Vec<Result<WorkflowStatus>>) -> Self {
        *self.assessment_statuses.lock().unwrap() = statuses
            .into_iter()
            .map(|status| {
                status.map(|status| AssessmentStatus {
                    status,
                    status_detail: format!("Assessment {}", status),
                })
            })
            .collect();
        self
    }

    /// Interaction poll responses, in order. Once drained, polls report COMPLETED.
    pub(crate) fn with_interaction_statuses(
        self,
        statuses: Vec<Result<InteractionStatus>>,
    ) -> Self {
        *self.interaction_statuses.lock().unwrap() = statuses.into();
        self
    }

    pub(crate) fn with_intent(self, intent: Result<UserIntent>) -> Self {
        *self.intent.lock().unwrap() = intent;
        self
    }

    pub(crate) fn failing_upload(self) -> Self {
        *self.upload_error.lock().unwrap() = Some(unavailable("CreateUploadUrl"));
        self
    }

    pub(crate) fn failing_stop(self) -> Self {
        *self.stop_error.lock().unwrap() = Some(unavailable("StopRefactoringAssessment"));
        self
    }

    /// Every assessment poll sleeps this long before answering.
    pub(crate) fn with_status_delay(self, delay: Duration) -> Self {
        *self.status_delay.lock().unwrap() = delay;
        self
    }

    /// Cancels `token` while serving the first assessment or interaction poll.
    pub(crate) fn cancel_on_first_status(self, token: CancellationToken) -> Self {
        *self.cancel_on_status.lock().unwrap() = Some(token);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.split(':').next() == Some(operation))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn fire_cancel(&self) {
        let token = self.cancel_on_status.lock().unwrap().take();
        if let Some(token) = token {
            token.cancel();
        }
    }

    fn next_id(counter: &Mutex<u32>, prefix: &str) -> String {
        let mut counter = counter.lock().unwrap();
        *counter += 1;
        format!("{}{}", prefix, *counter)
    }
}

#[async_trait]
impl RemoteWorkflowClient for MockClient {
    async fn create_engagement(&self) -> Result<Engagement> {
        self.record("create_engagement".to_string());
        Ok(Engagement {
            engagement_id: Self::next_id(&self.engagements, "E"),
        })
    }

    async fn upload_workspace_snapshot(&self, engagement_id: &str) -> Result<()> {
        self.record(format!("upload_workspace_snapshot:{}", engagement_id));
        match self.upload_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn start_assessment(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<StartedAssessment> {
        self.record(format!("start_assessment:{}:{}", engagement_id, user_input));
        Ok(StartedAssessment {
            assessment_id: Self::next_id(&self.assessments, "A"),
            status: WorkflowStatus::InProgress,
        })
    }

    async fn update_assessment(
        &self,
        engagement_id: &str,
        assessment_id: &str,
        user_input: &str,
    ) -> Result<WorkflowStatus> {
        self.record(format!(
            "update_assessment:{}:{}:{}",
            engagement_id, assessment_id, user_input
        ));
        Ok(WorkflowStatus::InProgress)
    }

    async fn stop_assessment(
        &self,
        engagement_id: &str,
        assessment_id: &str,
    ) -> Result<WorkflowStatus> {
        self.record(format!("stop_assessment:{}:{}", engagement_id, assessment_id));
        match self.stop_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(WorkflowStatus::Cancelled),
        }
    }

    async fn get_assessment_status(
        &self,
        _engagement_id: &str,
        assessment_id: &str,
    ) -> Result<AssessmentStatus> {
        self.record(format!("get_assessment_status:{}", assessment_id));

        let delay = *self.status_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.fire_cancel();

        let next = self.assessment_statuses.lock().unwrap().pop_front();
        next.unwrap_or(Ok(AssessmentStatus {
            status: WorkflowStatus::Completed,
            status_detail: String::new(),
        }))
    }

    async fn download_artifact(&self, _engagement_id: &str, assessment_id: &str) -> Result<String> {
        self.record(format!("download_artifact:{}", assessment_id));
        Ok(self.artifact.clone())
    }

    async fn start_interaction(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<StartedInteraction> {
        self.record(format!("start_interaction:{}:{}", engagement_id, user_input));
        Ok(StartedInteraction {
            interaction_id: Self::next_id(&self.interactions, "I"),
            status: WorkflowStatus::InProgress,
        })
    }

    async fn get_interaction_status(
        &self,
        _engagement_id: &str,
        interaction_id: &str,
    ) -> Result<InteractionStatus> {
        self.record(format!("get_interaction_status:{}", interaction_id));
        self.fire_cancel();
        let next = self.interaction_statuses.lock().unwrap().pop_front();
        next.unwrap_or(Ok(InteractionStatus {
            status: WorkflowStatus::Completed,
            response_text: "The plan splits the monolith into three services.".to_string(),
        }))
    }

    async fn derive_user_intent(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<UserIntent> {
        self.record(format!("derive_user_intent:{}:{}", engagement_id, user_input));
        self.intent.lock().unwrap().clone()
    }
}

pub(crate) struct MockWorkspace {
    empty: bool,
}

impl MockWorkspace {
    pub(crate) fn with_files() -> Self {
        Self { empty: false }
    }

    pub(crate) fn empty() -> Self {
        Self { empty: true }
    }
}

#[async_trait]
impl Workspace for MockWorkspace {
    async fn is_empty(&self) -> bool {
        self.empty
    }

    async fn snapshot(&self) -> Result<Vec<u8>> {
        Ok(b"{}".to_vec())
    }
}

#[derive(Default)]
pub(crate) struct MockArtifactStore {
    stored: Mutex<Vec<ArtifactRequest>>,
    exported: Mutex<Vec<(PathBuf, String)>>,
}

impl MockArtifactStore {
    pub(crate) fn stored(&self) -> Vec<ArtifactRequest> {
        self.stored.lock().unwrap().clone()
    }

    /// Every export as `(destination, content)`.
    pub(crate) fn exported(&self) -> Vec<(PathBuf, String)> {
        self.exported.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MockArtifactStore {
    async fn store_artifact(&self, request: ArtifactRequest) -> Result<ArtifactLocator> {
        let locator = ArtifactLocator(format!("memory://{}", request.file_name()));
        self.stored.lock().unwrap().push(request);
        Ok(locator)
    }

    async fn export_artifact(&self, content: &str, destination: &Path) -> Result<ArtifactLocator> {
        self.exported
            .lock()
            .unwrap()
            .push((destination.to_path_buf(), content.to_string()));
        Ok(ArtifactLocator(destination.display().to_string()))
    }
}

/// Collects every published event.
#[derive(Default)]
pub(crate) struct RecordingMessenger {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingMessenger {
    pub(crate) fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Text of every `answer` event, in order.
    pub(crate) fn answers(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Answer { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_placeholder(&self) -> Option<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::PlaceholderUpdate { placeholder, .. } => Some(placeholder),
                _ => None,
            })
            .last()
    }
}

impl Messenger for RecordingMessenger {
    fn publish(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) fn deps_with(
    client: Arc<MockClient>,
    workspace: MockWorkspace,
    store: Arc<MockArtifactStore>,
) -> ConversationDeps {
    ConversationDeps {
        client,
        workspace: Arc::new(workspace),
        artifacts: store,
        poll_policy: fast_policy(),
    }
}
