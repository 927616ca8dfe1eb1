use super::factory::SessionFactory;
use super::supervisor::SessionSupervisor;
use refassist_core::session::SessionSnapshot;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maps external session (tab) ids to their supervisors.
///
/// Sessions are created lazily on first access. The registry never reaches
/// into a session: callers dispose a supervisor before deleting it.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<SessionSupervisor>>>>,
    factory: SessionFactory,
}

impl SessionRegistry {
    pub fn new(factory: SessionFactory) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            factory,
        }
    }

    pub fn factory(&self) -> &SessionFactory {
        &self.factory
    }

    /// Returns the session's supervisor, creating it on first access.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The ID of the session to retrieve or create
    pub async fn get_or_create(&self, session_id: &str) -> Arc<SessionSupervisor> {
        if let Some(existing) = self.get(session_id).await {
            return existing;
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::info!(session_id, "[SessionRegistry] Creating session");
                Arc::new(self.factory.create(session_id))
            })
            .clone()
    }

    /// Gets a session's supervisor without creating it.
    ///
    /// # Returns
    ///
    /// `Some(supervisor)` if the session exists, `None` otherwise.
    pub async fn get(&self, session_id: &str) -> Option<Arc<SessionSupervisor>> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Removes a session and returns its supervisor, if any.
    pub async fn delete(&self, session_id: &str) -> Option<Arc<SessionSupervisor>> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(session_id);
        if removed.is_some() {
            tracing::info!(session_id, "[SessionRegistry] Session removed");
        }
        removed
    }

    /// All known session ids, sorted.
    pub async fn list_session_ids(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Snapshots of every session, sorted by session id.
    pub async fn snapshots(&self) -> Vec<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        let mut snapshots: Vec<SessionSnapshot> =
            sessions.values().map(|supervisor| supervisor.snapshot()).collect();
        snapshots.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        snapshots
    }
}
