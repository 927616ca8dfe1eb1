use async_trait::async_trait;
use refassist_core::Result;
use refassist_core::workflow::{
    AssessmentStatus, Engagement, InteractionStatus, StartedAssessment, StartedInteraction,
    UserIntent, WorkflowStatus,
};

/// Facade over the remote job API.
///
/// Every operation fails with `RefAssistError::RemoteCall` on transport
/// errors, non-success responses and bodies that do not decode.
#[async_trait]
pub trait RemoteWorkflowClient: Send + Sync {
    /// Opens a new server-side engagement.
    async fn create_engagement(&self) -> Result<Engagement>;

    /// Uploads the current workspace snapshot into the engagement.
    async fn upload_workspace_snapshot(&self, engagement_id: &str) -> Result<()>;

    /// Starts an assessment job.
    ///
    /// # Arguments
    ///
    /// * `engagement_id` - The engagement the job runs in
    /// * `user_input` - Goal text (captured prompt plus the latest utterance)
    async fn start_assessment(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<StartedAssessment>;

    /// Restarts an existing assessment with revision instructions.
    async fn update_assessment(
        &self,
        engagement_id: &str,
        assessment_id: &str,
        user_input: &str,
    ) -> Result<WorkflowStatus>;

    /// Asks the remote to stop a running assessment.
    ///
    /// Best-effort: callers log failures and carry on.
    async fn stop_assessment(
        &self,
        engagement_id: &str,
        assessment_id: &str,
    ) -> Result<WorkflowStatus>;

    async fn get_assessment_status(
        &self,
        engagement_id: &str,
        assessment_id: &str,
    ) -> Result<AssessmentStatus>;

    /// Fetches the generated plan as markdown text.
    async fn download_artifact(&self, engagement_id: &str, assessment_id: &str)
    -> Result<String>;

    async fn start_interaction(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<StartedInteraction>;

    async fn get_interaction_status(
        &self,
        engagement_id: &str,
        interaction_id: &str,
    ) -> Result<InteractionStatus>;

    /// Classifies a follow-up utterance.
    async fn derive_user_intent(&self, engagement_id: &str, user_input: &str)
    -> Result<UserIntent>;
}
