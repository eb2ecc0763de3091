use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::types::RoomSummary;
use crate::game::{resolve, Delivery, GameEngine, Outbound, Player, Room, ServerEvent};

pub type SharedRoom = Arc<Mutex<Room>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Room {0} does not exist")]
    RoomNotFound(String),

    #[error("Room {0} is full")]
    RoomFull(String),

    #[error("Pseudo {0} is already taken in this room")]
    PseudoTaken(String),

    #[error("The game in room {0} has already started")]
    GameAlreadyStarted(String),

    #[error("Pseudo must not be empty")]
    EmptyPseudo,
}

/// Outcome of creating or joining a room
#[derive(Debug)]
pub struct Admission {
    pub room_id: String,
    pub pseudo: String,
    pub deliveries: Vec<Delivery>,
}

/// Owns every live room, keyed by room id.
///
/// Lock order is always map first, then room. Teardown takes the map write
/// lock, so a join (map read lock held while the room is locked) can never
/// land in a room that is being dropped.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, SharedRoom>>,
    engine: GameEngine,
    shuffle_seed: Option<u64>,
    created: AtomicU64,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RoomRegistry {
    pub fn new(shuffle_seed: Option<u64>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            engine: GameEngine::new(),
            shuffle_seed,
            created: AtomicU64::new(0),
        }
    }

    fn next_rng(&self) -> StdRng {
        let serial = self.created.fetch_add(1, Ordering::Relaxed);
        match self.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(serial)),
            None => StdRng::from_os_rng(),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_room(
        &self,
        pseudo: &str,
        connection_id: &str,
    ) -> Result<Admission, RegistryError> {
        let pseudo = validate_pseudo(pseudo)?;
        let mut rooms = self.rooms.write().await;

        let room_id = loop {
            let candidate = petname::Petnames::default().generate_one(2, "-");
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
            debug!(room_id = %candidate, "Room id collision, regenerating");
        };

        let room = Room::new(
            room_id.clone(),
            Player::new(pseudo.clone(), connection_id),
            self.next_rng(),
        );
        let deliveries = resolve(
            &room,
            vec![
                Outbound::to_player(
                    pseudo.clone(),
                    ServerEvent::RoomCreated {
                        room_id: room_id.clone(),
                    },
                ),
                Outbound::room(ServerEvent::PlayerJoined {
                    players: room.pseudos(),
                }),
            ],
        );
        rooms.insert(room_id.clone(), Arc::new(Mutex::new(room)));

        info!(room_id = %room_id, host = %pseudo, total_rooms = rooms.len(), "Room created");
        Ok(Admission {
            room_id,
            pseudo,
            deliveries,
        })
    }

    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        room_id: &str,
        pseudo: &str,
        connection_id: &str,
    ) -> Result<Admission, RegistryError> {
        let pseudo = validate_pseudo(pseudo)?;
        let rooms = self.rooms.read().await;
        let shared = rooms
            .get(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))?;
        let mut room = shared.lock().await;

        if room.started() {
            return Err(RegistryError::GameAlreadyStarted(room_id.to_string()));
        }
        if room.is_full() {
            return Err(RegistryError::RoomFull(room_id.to_string()));
        }
        if room.player(&pseudo).is_some() {
            return Err(RegistryError::PseudoTaken(pseudo));
        }

        room.add_player(Player::new(pseudo.clone(), connection_id));
        info!(
            room_id = %room_id,
            pseudo = %pseudo,
            players = room.players().len(),
            "Player joined room"
        );

        let deliveries = resolve(
            &room,
            vec![
                Outbound::to_player(
                    pseudo.clone(),
                    ServerEvent::RoomJoined {
                        room_id: room_id.to_string(),
                    },
                ),
                Outbound::room(ServerEvent::PlayerJoined {
                    players: room.pseudos(),
                }),
            ],
        );
        Ok(Admission {
            room_id: room_id.to_string(),
            pseudo,
            deliveries,
        })
    }

    pub async fn get(&self, room_id: &str) -> Option<SharedRoom> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Drops a disconnected player. The room goes away with its last player.
    #[instrument(skip(self))]
    pub async fn remove_player(&self, room_id: &str, pseudo: &str) -> Vec<Delivery> {
        let mut rooms = self.rooms.write().await;
        let Some(shared) = rooms.get(room_id).cloned() else {
            warn!(room_id = %room_id, "Leaving a room that no longer exists");
            return Vec::new();
        };
        let mut room = shared.lock().await;

        let events = self.engine.player_left(&mut room, pseudo);
        if room.is_empty() {
            rooms.remove(room_id);
            info!(room_id = %room_id, total_rooms = rooms.len(), "Room closed");
            return Vec::new();
        }
        resolve(&room, events)
    }

    pub async fn summary(&self, room_id: &str) -> Option<RoomSummary> {
        let shared = self.get(room_id).await?;
        let room = shared.lock().await;
        Some(RoomSummary::from_room(&room))
    }

    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.read().await;
        let mut summaries = Vec::with_capacity(rooms.len());
        for shared in rooms.values() {
            let room = shared.lock().await;
            summaries.push(RoomSummary::from_room(&room));
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

fn validate_pseudo(pseudo: &str) -> Result<String, RegistryError> {
    let pseudo = pseudo.trim();
    if pseudo.is_empty() {
        return Err(RegistryError::EmptyPseudo);
    }
    Ok(pseudo.to_string())
}
