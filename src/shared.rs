use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ConfigError, ServerConfig};
use crate::room::RoomRegistry;
use crate::session::{InMemorySessionRepository, SessionRepository};
use crate::websockets::{ConnectionManager, GameGateway, InMemoryConnectionManager};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RoomRegistry>,
    pub sessions: Arc<dyn SessionRepository>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub gateway: Arc<GameGateway>,
}

impl AppState {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        sessions: Arc<dyn SessionRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        let gateway = Arc::new(GameGateway::new(
            Arc::clone(&rooms),
            Arc::clone(&sessions),
            Arc::clone(&connection_manager),
        ));
        Self {
            rooms,
            sessions,
            connection_manager,
            gateway,
        }
    }

    /// In-memory state for a configured server
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(RoomRegistry::new(config.shuffle_seed)),
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(InMemoryConnectionManager::new()),
        )
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::from_config(&ServerConfig {
            shuffle_seed: Some(1),
            ..ServerConfig::default()
        })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Config(_) | AppError::Io(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_maps_to_404_json() {
        let response = AppError::NotFound("Room x not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"error": "Room x not found"}));
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let error = AppError::from(ConfigError::InvalidShuffleSeed("x".to_string()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
