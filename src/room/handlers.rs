use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::RoomSummary;
use crate::shared::{AppError, AppState};

/// HTTP handler for listing all rooms
///
/// GET /rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    let rooms = state.rooms.list_rooms().await;
    info!(room_count = rooms.len(), "Rooms listed");
    Json(rooms)
}

/// HTTP handler for a single room
///
/// GET /rooms/:room_id
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummary>, AppError> {
    state
        .rooms
        .summary(&room_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Room {} not found", room_id)))
}
