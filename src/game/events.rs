use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

use super::cards::{Card, CardFace};
use super::room::Room;

/// A player's public state as broadcast to the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub pseudo: String,
    pub hand: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub pseudo: String,
    pub score: i32,
    pub hand: Vec<Card>,
}

/// Server to client events, one JSON object per frame tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
#[strum(serialize_all = "kebab-case")]
pub enum ServerEvent {
    RoomCreated {
        room_id: String,
    },
    RoomJoined {
        room_id: String,
    },
    PlayerJoined {
        players: Vec<String>,
    },
    PlayerLeft {
        players: Vec<String>,
    },
    GameStarted {
        players: Vec<PlayerView>,
        deck_size: usize,
        discard_pile: Vec<Card>,
    },
    GameLaunched {
        current_player: String,
        current_turn: usize,
        players: Vec<PlayerView>,
        deck_size: usize,
        discard_pile: Vec<Card>,
    },
    CardFlipped {
        card_id: String,
        image: String,
        value: i8,
        pseudo: String,
        players: Vec<PlayerView>,
    },
    NextTurn {
        current_player: String,
        current_turn: usize,
        players: Vec<PlayerView>,
    },
    CardDrawn {
        player: String,
        card: CardFace,
        deck_size: usize,
        discard_pile: Vec<Card>,
    },
    CardDrawnFromDiscard {
        player: String,
        card: CardFace,
        deck_size: usize,
        discard_pile: Vec<Card>,
    },
    CardReplaced {
        player: String,
        card_id: String,
        players: Vec<PlayerView>,
        deck_size: usize,
        discard_pile: Vec<Card>,
    },
    DrawnCardDiscarded {
        deck_size: usize,
        discard_pile: Vec<Card>,
        from_discard: bool,
    },
    ColumnUpdate {
        players: Vec<PlayerView>,
        discard_pile: Vec<Card>,
        completed_value: i8,
    },
    LastRound {
        message: String,
    },
    GameOver {
        winner: String,
        message: String,
        results: Vec<PlayerResult>,
    },
    Error {
        message: String,
    },
    Message {
        message: String,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    pub(crate) fn game_started(room: &Room) -> Self {
        ServerEvent::GameStarted {
            players: room.snapshot(),
            deck_size: room.deck().remaining_count(),
            discard_pile: room.discard_pile().to_vec(),
        }
    }

    pub(crate) fn game_launched(room: &Room) -> Self {
        ServerEvent::GameLaunched {
            current_player: current_pseudo(room),
            current_turn: room.current_turn(),
            players: room.snapshot(),
            deck_size: room.deck().remaining_count(),
            discard_pile: room.discard_pile().to_vec(),
        }
    }

    pub(crate) fn next_turn(room: &Room) -> Self {
        ServerEvent::NextTurn {
            current_player: current_pseudo(room),
            current_turn: room.current_turn(),
            players: room.snapshot(),
        }
    }

    pub(crate) fn card_flipped(room: &Room, pseudo: &str, card: &Card) -> Self {
        ServerEvent::CardFlipped {
            card_id: card.id().to_string(),
            image: card.image().to_string(),
            value: card.value(),
            pseudo: pseudo.to_string(),
            players: room.snapshot(),
        }
    }
}

fn current_pseudo(room: &Room) -> String {
    room.current_player()
        .map(|p| p.pseudo().to_string())
        .unwrap_or_default()
}

/// Who an outbound event is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// Every player currently in the room
    Room,
    /// A single player, by pseudo
    Player(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipients: Recipients,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn room(event: ServerEvent) -> Self {
        Self {
            recipients: Recipients::Room,
            event,
        }
    }

    pub fn to_player(pseudo: impl Into<String>, event: ServerEvent) -> Self {
        Self {
            recipients: Recipients::Player(pseudo.into()),
            event,
        }
    }

    /// Connection ids this event must reach, resolved against the room's
    /// current roster
    pub fn connection_ids(&self, room: &Room) -> Vec<String> {
        match &self.recipients {
            Recipients::Room => room
                .players()
                .iter()
                .map(|p| p.connection_id().to_string())
                .collect(),
            Recipients::Player(pseudo) => room
                .player(pseudo)
                .map(|p| vec![p.connection_id().to_string()])
                .unwrap_or_default(),
        }
    }
}

/// An outbound event with its recipients already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub connection_ids: Vec<String>,
    pub event: ServerEvent,
}

pub fn resolve(room: &Room, outbounds: Vec<Outbound>) -> Vec<Delivery> {
    outbounds
        .into_iter()
        .map(|outbound| Delivery {
            connection_ids: outbound.connection_ids(room),
            event: outbound.event,
        })
        .collect()
}
