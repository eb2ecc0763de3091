// Library crate for the Skyjo game server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod room;
pub mod session;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::{ConfigError, ServerConfig};
pub use game::{GameAction, GameEngine, GameError, Room, ServerEvent};
pub use room::{RegistryError, RoomRegistry, RoomSummary};
pub use session::{InMemorySessionRepository, Session, SessionRepository};
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientIntent, ConnectionManager, GameGateway, InMemoryConnectionManager, MessageHandler,
};

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Every HTTP and WebSocket route the server exposes
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Skyjo server is running" }))
        .route("/rooms", get(room::list_rooms))
        .route("/rooms/:room_id", get(room::get_room))
        .route("/ws", get(websockets::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
