//! Routes inbound chat commands to sessions.

use crate::conversation::messages;
use crate::session::{InteractionHandle, SessionRegistry};
use refassist_core::auth::{AuthFollowUpType, AuthProvider};
use refassist_core::event::UiCommand;
use refassist_core::workspace::plan_file_name;
use refassist_core::{RefAssistError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Entry point for the presentation layer.
///
/// Every `UiCommand` ends up as a registry or supervisor operation. Chat
/// messages are checked against the auth provider first; when the user is
/// not connected an `authNeeded` event is emitted instead and the message is
/// dropped. Once the check passes again the session's auth gate is reopened.
pub struct ChatController {
    registry: Arc<SessionRegistry>,
    auth: Arc<dyn AuthProvider>,
}

impl ChatController {
    pub fn new(registry: Arc<SessionRegistry>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { registry, auth }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Handles one command.
    ///
    /// # Returns
    ///
    /// A handle for the queued interaction when the command started one.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` for an empty chat message or a download from an
    /// unknown session, and the remote or storage error of a failed download.
    pub async fn handle(&self, command: UiCommand) -> Result<Option<InteractionHandle>> {
        match command {
            UiCommand::ChatMessage {
                session_id,
                message,
            } => self.chat_message(&session_id, &message).await,
            UiCommand::FollowUpClicked {
                session_id,
                follow_up,
            } => self.chat_message(&session_id, &follow_up.prompt).await,
            UiCommand::StopResponse { session_id } => {
                self.stop_response(&session_id).await;
                Ok(None)
            }
            UiCommand::TabClosed { session_id } => {
                self.tab_closed(&session_id).await;
                Ok(None)
            }
            UiCommand::AuthChanged { authenticated, .. } => {
                self.auth_changed(authenticated).await;
                Ok(None)
            }
            UiCommand::Help { session_id } => {
                let supervisor = self.registry.get_or_create(&session_id).await;
                Ok(Some(supervisor.help()))
            }
            UiCommand::DownloadPlan {
                session_id,
                destination,
            } => {
                self.download_plan(&session_id, destination).await?;
                Ok(None)
            }
            UiCommand::AuthFollowUpClicked {
                session_id,
                auth_type,
            } => {
                self.auth_follow_up_clicked(&session_id, auth_type);
                Ok(None)
            }
        }
    }

    async fn chat_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<Option<InteractionHandle>> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RefAssistError::illegal_state(format!(
                "empty chat message for session '{}'",
                session_id
            )));
        }

        let supervisor = self.registry.get_or_create(session_id).await;

        let credential = self.auth.credential_state().await;
        if !credential.is_connected() {
            tracing::info!(
                session_id,
                ?credential,
                "[ChatController] Authentication needed"
            );
            let (auth_type, prompt) = credential.auth_prompt();
            self.registry
                .factory()
                .session_messenger(session_id)
                .send_auth_needed(auth_type, prompt);
            supervisor.auth_changed(false);
            return Ok(None);
        }

        if supervisor.snapshot().is_authenticating {
            tracing::info!(session_id, "[ChatController] Credentials restored");
            supervisor.auth_changed(true);
        }
        Ok(Some(supervisor.send(message)))
    }

    /// Fetches the current plan again and writes it to `destination`, or to
    /// the plan's default file name when none is given.
    async fn download_plan(&self, session_id: &str, destination: Option<PathBuf>) -> Result<()> {
        let supervisor = self.registry.get(session_id).await.ok_or_else(|| {
            RefAssistError::illegal_state(format!(
                "download requested for unknown session '{}'",
                session_id
            ))
        })?;
        let messenger = self.registry.factory().session_messenger(session_id);

        let snapshot = supervisor.snapshot();
        let (Some(engagement_id), Some(assessment_id)) =
            (snapshot.engagement_id, snapshot.assessment_id)
        else {
            tracing::info!(session_id, "[ChatController] No plan to download");
            messenger.send_answer(messages::NO_PLAN_TO_DOWNLOAD);
            return Ok(());
        };

        let deps = self.registry.factory().deps();
        let destination =
            destination.unwrap_or_else(|| PathBuf::from(plan_file_name(&assessment_id)));
        let saved = match deps.client.download_artifact(&engagement_id, &assessment_id).await {
            Ok(content) => deps.artifacts.export_artifact(&content, &destination).await,
            Err(err) => Err(err),
        };

        match saved {
            Ok(locator) => {
                tracing::info!(
                    session_id,
                    %assessment_id,
                    %locator,
                    "[ChatController] Plan downloaded"
                );
                messenger.send_answer(messages::plan_downloaded(&locator));
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    session_id,
                    %assessment_id,
                    error = %err,
                    "[ChatController] Plan download failed"
                );
                messenger.send_answer(messages::DOWNLOAD_FAILED);
                Err(err)
            }
        }
    }

    /// The user went off to re-authenticate; input stays disabled until the
    /// next auth change.
    fn auth_follow_up_clicked(&self, session_id: &str, auth_type: AuthFollowUpType) {
        tracing::info!(session_id, ?auth_type, "[ChatController] Auth follow-up clicked");
        let messenger = self.registry.factory().session_messenger(session_id);
        messenger.send_answer(messages::REAUTHENTICATE);
        messenger.send_input_enabled(false);
    }

    async fn stop_response(&self, session_id: &str) {
        match self.registry.get(session_id).await {
            Some(supervisor) => {
                supervisor.cancel();
            }
            None => tracing::debug!(session_id, "[ChatController] Stop for unknown session"),
        }
    }

    async fn tab_closed(&self, session_id: &str) {
        if let Some(supervisor) = self.registry.get(session_id).await {
            supervisor.dispose();
        }
        self.registry.delete(session_id).await;
    }

    /// Fans an auth change out to every open session.
    async fn auth_changed(&self, authenticated: bool) {
        let credential = self.auth.credential_state().await;
        let (auth_type, prompt) = credential.auth_prompt();

        for session_id in self.registry.list_session_ids().await {
            let Some(supervisor) = self.registry.get(&session_id).await else {
                continue;
            };
            supervisor.auth_changed(authenticated);

            let messenger = self.registry.factory().session_messenger(&session_id);
            if authenticated {
                messenger.send_input_enabled(true);
            } else {
                messenger.send_auth_needed(auth_type, prompt);
            }
        }
    }
}
