use super::session::ConsultationSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared map of live sessions, keyed by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<ConsultationSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Arc<ConsultationSession>) {
        self.sessions
            .write()
            .await
            .insert(session.session_id().to_string(), session);
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<ConsultationSession>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &str) -> Option<Arc<ConsultationSession>> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
