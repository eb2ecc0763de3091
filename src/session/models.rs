use serde::{Deserialize, Serialize};

/// What a connection is bound to once it has created or joined a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub connection_id: String,
    pub room_id: String,
    pub pseudo: String,
}

impl Session {
    pub fn new(
        connection_id: impl Into<String>,
        room_id: impl Into<String>,
        pseudo: impl Into<String>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            room_id: room_id.into(),
            pseudo: pseudo.into(),
        }
    }
}
