use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::Session;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Connection is already in room {room_id} as {pseudo}")]
    AlreadyBound { room_id: String, pseudo: String },
}

/// Connection id to session lookup
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Binds a connection to a room. A connection holds at most one session.
    async fn bind(&self, session: Session) -> Result<(), SessionError>;

    async fn get(&self, connection_id: &str) -> Option<Session>;

    async fn remove(&self, connection_id: &str) -> Option<Session>;

    async fn count(&self) -> usize;
}

/// In-memory implementation of SessionRepository
///
/// Sessions only live as long as their connection, so nothing here survives a
/// restart.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self))]
    async fn bind(&self, session: Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(&session.connection_id) {
            warn!(
                connection_id = %session.connection_id,
                room_id = %existing.room_id,
                "Connection already has a session"
            );
            return Err(SessionError::AlreadyBound {
                room_id: existing.room_id.clone(),
                pseudo: existing.pseudo.clone(),
            });
        }

        debug!(
            connection_id = %session.connection_id,
            room_id = %session.room_id,
            pseudo = %session.pseudo,
            "Session bound"
        );
        sessions.insert(session.connection_id.clone(), session);
        Ok(())
    }

    async fn get(&self, connection_id: &str) -> Option<Session> {
        self.sessions.read().await.get(connection_id).cloned()
    }

    async fn remove(&self, connection_id: &str) -> Option<Session> {
        let removed = self.sessions.write().await.remove(connection_id);
        if let Some(session) = &removed {
            debug!(connection_id = %connection_id, room_id = %session.room_id, "Session removed");
        }
        removed
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_and_lookup() {
        let repository = InMemorySessionRepository::new();
        repository
            .bind(Session::new("conn-a", "room-1", "alice"))
            .await
            .unwrap();

        let session = repository.get("conn-a").await.unwrap();
        assert_eq!(session.room_id, "room-1");
        assert_eq!(session.pseudo, "alice");
        assert!(repository.get("conn-b").await.is_none());
    }

    #[tokio::test]
    async fn test_second_bind_is_rejected() {
        let repository = InMemorySessionRepository::new();
        repository
            .bind(Session::new("conn-a", "room-1", "alice"))
            .await
            .unwrap();

        let result = repository
            .bind(Session::new("conn-a", "room-2", "alice"))
            .await;

        assert_eq!(
            result,
            Err(SessionError::AlreadyBound {
                room_id: "room-1".to_string(),
                pseudo: "alice".to_string(),
            })
        );
        assert_eq!(repository.get("conn-a").await.unwrap().room_id, "room-1");
    }

    #[tokio::test]
    async fn test_remove_returns_session_once() {
        let repository = InMemorySessionRepository::new();
        repository
            .bind(Session::new("conn-a", "room-1", "alice"))
            .await
            .unwrap();

        assert!(repository.remove("conn-a").await.is_some());
        assert!(repository.remove("conn-a").await.is_none());
        assert_eq!(repository.count().await, 0);
    }
}
