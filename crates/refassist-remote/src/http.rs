//! JSON-over-HTTP implementation of [`RemoteWorkflowClient`].
//!
//! Every operation is `POST {endpoint}/{Operation}` with a camelCase JSON
//! body that also carries a `clientMetadata` object. Uploads and downloads go
//! through presigned URLs handed out by `CreateUploadUrl` / `CreateDownloadUrl`.

use crate::client::RemoteWorkflowClient;
use async_trait::async_trait;
use refassist_core::auth::AuthProvider;
use refassist_core::config::RemoteConfig;
use refassist_core::workflow::{
    AssessmentStatus, Engagement, InteractionStatus, StartedAssessment, StartedInteraction,
    UserIntent, WorkflowStatus,
};
use refassist_core::workspace::Workspace;
use refassist_core::{RefAssistError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CREATE_ENGAGEMENT: &str = "CreateEngagement";
const CREATE_UPLOAD_URL: &str = "CreateUploadUrl";
const CREATE_DOWNLOAD_URL: &str = "CreateDownloadUrl";
const START_ASSESSMENT: &str = "StartRefactoringAssessment";
const UPDATE_ASSESSMENT: &str = "UpdateRefactoringAssessment";
const STOP_ASSESSMENT: &str = "StopRefactoringAssessment";
const GET_ASSESSMENT_STATUS: &str = "GetRefactoringAssessmentStatus";
const START_INTERACTION: &str = "StartRefactoringInteraction";
const GET_INTERACTION: &str = "GetRefactoringInteraction";
const DERIVE_USER_INTENT: &str = "DeriveUserIntent";

const ARTIFACT_CONTENT_TYPE: &str = "text/markdown";
const OUTPUT_TYPE_MARKDOWN: &str = "markdown";

/// Opaque client description attached to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub client_name: String,
    pub client_version: String,
}

impl Default for ClientMetadata {
    fn default() -> Self {
        Self {
            client_name: "refassist".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// reqwest-backed client for the remote job API.
pub struct HttpWorkflowClient {
    client: Client,
    endpoint: String,
    metadata: ClientMetadata,
    workspace: Arc<dyn Workspace>,
    auth: Option<Arc<dyn AuthProvider>>,
    identity_token: Option<String>,
}

impl HttpWorkflowClient {
    /// Creates a client for the configured endpoint.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, timeout and optional static identity token
    /// * `workspace` - Source of the snapshot sent by `upload_workspace_snapshot`
    pub fn new(config: &RemoteConfig, workspace: Arc<dyn Workspace>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RefAssistError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            metadata: ClientMetadata::default(),
            workspace,
            auth: None,
            identity_token: config.identity_token.clone(),
        })
    }

    /// Uses the auth provider's identity token, falling back to the configured one.
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn operation_url(&self, operation: &str) -> String {
        format!("{}/{}", self.endpoint, operation)
    }

    async fn bearer_token(&self) -> Option<String> {
        if let Some(auth) = &self.auth {
            if let Some(token) = auth.identity_token().await {
                return Some(token);
            }
        }
        self.identity_token.clone()
    }

    /// POSTs `params` (plus client metadata) to `operation` and decodes the reply.
    async fn call<P, R>(&self, operation: &'static str, params: P) -> Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let body = Envelope {
            params,
            client_metadata: &self.metadata,
        };

        let mut request = self.client.post(self.operation_url(operation)).json(&body);
        if let Some(token) = self.bearer_token().await {
            request = request.bearer_auth(token);
        }

        tracing::debug!(operation, "[HttpWorkflowClient] Sending request");
        let response = send(operation, request).await?;

        response.json::<R>().await.map_err(|e| {
            RefAssistError::remote_call(operation, format!("malformed response: {}", e))
        })
    }
}

/// Sends a request and turns transport failures and non-2xx replies into `RemoteCall`.
async fn send(operation: &'static str, request: RequestBuilder) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| RefAssistError::remote_call(operation, e))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        tracing::warn!(operation, %status, "[HttpWorkflowClient] Remote returned an error");
        return Err(RefAssistError::remote_call(
            operation,
            format!("HTTP {}: {}", status, error_text),
        ));
    }
    Ok(response)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, P> {
    #[serde(flatten)]
    params: P,
    client_metadata: &'a ClientMetadata,
}

#[derive(Serialize)]
struct NoParams {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EngagementParams<'a> {
    engagement_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentParams<'a> {
    engagement_id: &'a str,
    assessment_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartAssessmentParams<'a> {
    engagement_id: &'a str,
    chat_message: &'a str,
    output_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAssessmentParams<'a> {
    engagement_id: &'a str,
    assessment_id: &'a str,
    chat_message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatParams<'a> {
    engagement_id: &'a str,
    chat_message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadParams<'a> {
    engagement_id: &'a str,
    assessment_id: &'a str,
    content_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractionParams<'a> {
    engagement_id: &'a str,
    interaction_id: &'a str,
}

#[derive(Deserialize)]
struct UploadUrlResponse {
    #[serde(rename = "PresignedUrl", alias = "presignedUrl")]
    presigned_url: String,
}

#[derive(Deserialize)]
struct DownloadUrlResponse {
    #[serde(rename = "s3url", alias = "downloadUrl")]
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartAssessmentResponse {
    assessment_id: String,
    workflow_status: WorkflowStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowStatusResponse {
    workflow_status: WorkflowStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentStatusResponse {
    workflow_status: WorkflowStatus,
    #[serde(default)]
    assessment_status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartInteractionResponse {
    interaction_id: String,
    workflow_status: WorkflowStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionResponse {
    workflow_status: WorkflowStatus,
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserIntentResponse {
    #[serde(alias = "intent")]
    user_intent: UserIntent,
}

#[async_trait]
impl RemoteWorkflowClient for HttpWorkflowClient {
    async fn create_engagement(&self) -> Result<Engagement> {
        let engagement: Engagement = self.call(CREATE_ENGAGEMENT, NoParams {}).await?;
        tracing::info!(
            engagement_id = %engagement.engagement_id,
            "[HttpWorkflowClient] Engagement created"
        );
        Ok(engagement)
    }

    async fn upload_workspace_snapshot(&self, engagement_id: &str) -> Result<()> {
        let upload: UploadUrlResponse = self
            .call(CREATE_UPLOAD_URL, EngagementParams { engagement_id })
            .await?;

        let snapshot = self.workspace.snapshot().await?;
        let size = snapshot.len();
        let request = self
            .client
            .put(&upload.presigned_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(snapshot);
        send(CREATE_UPLOAD_URL, request).await?;

        tracing::info!(engagement_id, bytes = size, "[HttpWorkflowClient] Workspace uploaded");
        Ok(())
    }

    async fn start_assessment(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<StartedAssessment> {
        let response: StartAssessmentResponse = self
            .call(
                START_ASSESSMENT,
                StartAssessmentParams {
                    engagement_id,
                    chat_message: user_input,
                    output_type: OUTPUT_TYPE_MARKDOWN,
                },
            )
            .await?;
        Ok(StartedAssessment {
            assessment_id: response.assessment_id,
            status: response.workflow_status,
        })
    }

    async fn update_assessment(
        &self,
        engagement_id: &str,
        assessment_id: &str,
        user_input: &str,
    ) -> Result<WorkflowStatus> {
        let response: WorkflowStatusResponse = self
            .call(
                UPDATE_ASSESSMENT,
                UpdateAssessmentParams {
                    engagement_id,
                    assessment_id,
                    chat_message: user_input,
                },
            )
            .await?;
        Ok(response.workflow_status)
    }

    async fn stop_assessment(
        &self,
        engagement_id: &str,
        assessment_id: &str,
    ) -> Result<WorkflowStatus> {
        let response: WorkflowStatusResponse = self
            .call(
                STOP_ASSESSMENT,
                AssessmentParams {
                    engagement_id,
                    assessment_id,
                },
            )
            .await?;
        Ok(response.workflow_status)
    }

    async fn get_assessment_status(
        &self,
        engagement_id: &str,
        assessment_id: &str,
    ) -> Result<AssessmentStatus> {
        let response: AssessmentStatusResponse = self
            .call(
                GET_ASSESSMENT_STATUS,
                AssessmentParams {
                    engagement_id,
                    assessment_id,
                },
            )
            .await?;
        Ok(AssessmentStatus {
            status: response.workflow_status,
            status_detail: response.assessment_status,
        })
    }

    async fn download_artifact(
        &self,
        engagement_id: &str,
        assessment_id: &str,
    ) -> Result<String> {
        let download: DownloadUrlResponse = self
            .call(
                CREATE_DOWNLOAD_URL,
                DownloadParams {
                    engagement_id,
                    assessment_id,
                    content_type: ARTIFACT_CONTENT_TYPE,
                },
            )
            .await?;

        let response = send(CREATE_DOWNLOAD_URL, self.client.get(&download.url)).await?;
        response
            .text()
            .await
            .map_err(|e| RefAssistError::remote_call(CREATE_DOWNLOAD_URL, e))
    }

    async fn start_interaction(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<StartedInteraction> {
        let response: StartInteractionResponse = self
            .call(
                START_INTERACTION,
                ChatParams {
                    engagement_id,
                    chat_message: user_input,
                },
            )
            .await?;
        Ok(StartedInteraction {
            interaction_id: response.interaction_id,
            status: response.workflow_status,
        })
    }

    async fn get_interaction_status(
        &self,
        engagement_id: &str,
        interaction_id: &str,
    ) -> Result<InteractionStatus> {
        let response: InteractionResponse = self
            .call(
                GET_INTERACTION,
                InteractionParams {
                    engagement_id,
                    interaction_id,
                },
            )
            .await?;
        Ok(InteractionStatus {
            status: response.workflow_status,
            response_text: response.response,
        })
    }

    async fn derive_user_intent(
        &self,
        engagement_id: &str,
        user_input: &str,
    ) -> Result<UserIntent> {
        let response: UserIntentResponse = self
            .call(
                DERIVE_USER_INTENT,
                ChatParams {
                    engagement_id,
                    chat_message: user_input,
                },
            )
            .await?;
        Ok(response.user_intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyWorkspace;

    #[async_trait]
    impl Workspace for EmptyWorkspace {
        async fn is_empty(&self) -> bool {
            true
        }

        async fn snapshot(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn client_for(endpoint: &str) -> HttpWorkflowClient {
        let config = RemoteConfig {
            endpoint: endpoint.to_string(),
            request_timeout_secs: 2,
            identity_token: None,
        };
        HttpWorkflowClient::new(&config, Arc::new(EmptyWorkspace)).unwrap()
    }

    #[test]
    fn request_body_flattens_params_next_to_client_metadata() {
        let metadata = ClientMetadata::default();
        let body = Envelope {
            params: UpdateAssessmentParams {
                engagement_id: "E1",
                assessment_id: "A1",
                chat_message: "optimize for costs",
            },
            client_metadata: &metadata,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["engagementId"], "E1");
        assert_eq!(json["assessmentId"], "A1");
        assert_eq!(json["chatMessage"], "optimize for costs");
        assert_eq!(json["clientMetadata"]["clientName"], "refassist");
    }

    #[test]
    fn empty_params_still_send_client_metadata() {
        let metadata = ClientMetadata::default();
        let json = serde_json::to_value(Envelope {
            params: NoParams {},
            client_metadata: &metadata,
        })
        .unwrap();

        assert_eq!(json.as_object().map(|o| o.len()), Some(1));
        assert!(json.get("clientMetadata").is_some());
    }

    #[test]
    fn responses_decode_from_remote_field_names() {
        let status: AssessmentStatusResponse = serde_json::from_str(
            r#"{"workflowStatus":"IN_PROGRESS","assessmentStatus":"Analyzing modules"}"#,
        )
        .unwrap();
        assert_eq!(status.workflow_status, WorkflowStatus::InProgress);
        assert_eq!(status.assessment_status, "Analyzing modules");

        let upload: UploadUrlResponse =
            serde_json::from_str(r#"{"PresignedUrl":"https://bucket/upload"}"#).unwrap();
        assert_eq!(upload.presigned_url, "https://bucket/upload");

        let intent: UserIntentResponse =
            serde_json::from_str(r#"{"intent":"ASSESSMENT"}"#).unwrap();
        assert_eq!(intent.user_intent, UserIntent::Assessment);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_endpoint() {
        let client = client_for("http://localhost:3030/");
        assert_eq!(
            client.operation_url(CREATE_ENGAGEMENT),
            "http://localhost:3030/CreateEngagement"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_remote_call_error() {
        let client = client_for("http://127.0.0.1:1");

        let err = client.create_engagement().await.unwrap_err();

        match err {
            RefAssistError::RemoteCall { endpoint, .. } => {
                assert_eq!(endpoint, CREATE_ENGAGEMENT)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
