use serde::{Deserialize, Serialize};

use crate::game::{GamePhase, Room};

/// Public listing entry for a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub host: String,
    pub player_count: usize,
    pub phase: GamePhase,
}

impl RoomSummary {
    pub fn from_room(room: &Room) -> Self {
        Self {
            id: room.id().to_string(),
            host: room
                .host()
                .map(|p| p.pseudo().to_string())
                .unwrap_or_default(),
            player_count: room.players().len(),
            phase: room.phase(),
        }
    }
}
