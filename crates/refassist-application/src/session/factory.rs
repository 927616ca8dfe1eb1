use super::supervisor::SessionSupervisor;
use crate::conversation::ConversationDeps;
use refassist_core::messenger::{Messenger, SessionMessenger};
use refassist_core::session::ConversationSession;
use std::sync::Arc;

/// Builds supervisors from the collaborators every session shares.
#[derive(Clone)]
pub struct SessionFactory {
    deps: ConversationDeps,
    messenger: Arc<dyn Messenger>,
}

impl SessionFactory {
    /// Creates a new SessionFactory.
    ///
    /// # Arguments
    ///
    /// * `deps` - Remote client, workspace, artifact store and poll policy
    /// * `messenger` - Sink that receives every session's events
    pub fn new(deps: ConversationDeps, messenger: Arc<dyn Messenger>) -> Self {
        Self { deps, messenger }
    }

    /// Spawns a supervisor for a fresh session at `StartOfConversation`.
    pub fn create(&self, session_id: &str) -> SessionSupervisor {
        SessionSupervisor::spawn(
            ConversationSession::new(session_id),
            self.deps.clone(),
            self.session_messenger(session_id),
        )
    }

    pub fn deps(&self) -> &ConversationDeps {
        &self.deps
    }

    /// A messenger bound to `session_id`, for events raised outside the state machine.
    pub fn session_messenger(&self, session_id: &str) -> SessionMessenger {
        SessionMessenger::new(session_id, self.messenger.clone())
    }
}
