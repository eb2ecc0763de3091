use serde::{Deserialize, Deserializer};

use crate::game::{GameAction, ServerEvent};

/// Client to server intents, one JSON object per frame tagged by `type`.
///
/// Card payloads that clients echo back (`image`, `value`, `newCard`, `card`)
/// are accepted in any JSON shape so older clients keep working, but the
/// server never reads them: it already knows every card it dealt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientIntent {
    CreateRoom {
        pseudo: String,
    },
    JoinRoom {
        room_id: String,
        pseudo: String,
    },
    StartGame,
    /// Sent by older clients after every initial reveal; launching is the
    /// server's call
    LaunchGame,
    FlipCard {
        pseudo: Option<String>,
        card_id: String,
        image: Option<serde_json::Value>,
        value: Option<serde_json::Value>,
        choose_card: Option<serde_json::Value>,
    },
    DrawCard,
    DrawFromDiscard {
        pseudo: Option<String>,
    },
    ReplaceCard {
        pseudo: Option<String>,
        old_card_id: String,
        new_card: Option<serde_json::Value>,
    },
    DiscardDrawnCard {
        pseudo: Option<String>,
        card: Option<serde_json::Value>,
        from_discard: Option<bool>,
    },
    ColumnCompleted {
        pseudo: Option<String>,
        #[serde(deserialize_with = "column_index")]
        column: usize,
        value: Option<serde_json::Value>,
    },
    Message {
        message: String,
    },
}

/// Where an intent goes once decoded
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    CreateRoom {
        pseudo: String,
    },
    JoinRoom {
        room_id: String,
        pseudo: String,
    },
    /// An action against the sender's current room. `claimed_pseudo` is the
    /// player the client says it is acting for, if it said so at all.
    InRoom {
        claimed_pseudo: Option<String>,
        action: GameAction,
    },
    /// Known intents the server has nothing to do for
    Ignored {
        intent: &'static str,
    },
}

impl ClientIntent {
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientIntent::CreateRoom { .. } => "create-room",
            ClientIntent::JoinRoom { .. } => "join-room",
            ClientIntent::StartGame => "start-game",
            ClientIntent::LaunchGame => "launch-game",
            ClientIntent::FlipCard { .. } => "flip-card",
            ClientIntent::DrawCard => "draw-card",
            ClientIntent::DrawFromDiscard { .. } => "draw-from-discard",
            ClientIntent::ReplaceCard { .. } => "replace-card",
            ClientIntent::DiscardDrawnCard { .. } => "discard-drawn-card",
            ClientIntent::ColumnCompleted { .. } => "column-completed",
            ClientIntent::Message { .. } => "message",
        }
    }
}

impl From<ClientIntent> for Routed {
    fn from(intent: ClientIntent) -> Self {
        let in_room = |claimed_pseudo: Option<String>, action: GameAction| Routed::InRoom {
            claimed_pseudo,
            action,
        };

        match intent {
            ClientIntent::CreateRoom { pseudo } => Routed::CreateRoom { pseudo },
            ClientIntent::JoinRoom { room_id, pseudo } => Routed::JoinRoom { room_id, pseudo },
            ClientIntent::StartGame => in_room(None, GameAction::StartGame),
            ClientIntent::LaunchGame => Routed::Ignored {
                intent: "launch-game",
            },
            ClientIntent::FlipCard {
                pseudo, card_id, ..
            } => in_room(pseudo, GameAction::FlipCard { card_id }),
            ClientIntent::DrawCard => in_room(None, GameAction::DrawCard),
            ClientIntent::DrawFromDiscard { pseudo } => in_room(pseudo, GameAction::DrawFromDiscard),
            ClientIntent::ReplaceCard {
                pseudo,
                old_card_id,
                ..
            } => in_room(pseudo, GameAction::ReplaceCard { old_card_id }),
            ClientIntent::DiscardDrawnCard {
                pseudo,
                from_discard,
                ..
            } => in_room(
                pseudo,
                GameAction::DiscardDrawnCard {
                    claimed_from_discard: from_discard,
                },
            ),
            ClientIntent::ColumnCompleted { pseudo, column, .. } => {
                in_room(pseudo, GameAction::ColumnCompleted { column })
            }
            ClientIntent::Message { message } => in_room(None, GameAction::Chat { message }),
        }
    }
}

/// Serializes an event into a text frame
pub fn encode(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Columns arrive either as a number or as a numeric string
fn column_index<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Column {
        Number(usize),
        Text(String),
    }

    match Column::deserialize(deserializer)? {
        Column::Number(n) => Ok(n),
        Column::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid column: {:?}", s))),
    }
}
