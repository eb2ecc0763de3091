use std::sync::Arc;

use skyjo::{
    room::RoomRegistry,
    session::{InMemorySessionRepository, SessionRepository},
    websockets::{ConnectionManager, GameGateway},
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SEED: u64 = 2024;

pub struct TestSetup {
    pub gateway: GameGateway,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub rooms: Arc<RoomRegistry>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub room_id: String,
    /// Pseudos in join order
    pub players: Vec<String>,
}

/// Connection id the setup assigns to a pseudo
pub fn conn(pseudo: &str) -> String {
    format!("conn-{}", pseudo)
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    seed: u64,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            seed: TEST_SEED,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol"])
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the gateway, has the first player create a room and the rest
    /// join it, then clears every recorded frame
    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let rooms = Arc::new(RoomRegistry::new(Some(self.seed)));
        let sessions = Arc::new(InMemorySessionRepository::new());

        let gateway = GameGateway::new(
            Arc::clone(&rooms),
            Arc::clone(&sessions) as Arc<dyn SessionRepository>,
            Arc::clone(&mock_conn_manager) as Arc<dyn ConnectionManager>,
        );

        let mut setup = TestSetup {
            gateway,
            mock_conn_manager,
            rooms,
            sessions,
            room_id: String::new(),
            players: self.players.clone(),
        };

        let mut players = self.players.iter();
        if let Some(host) = players.next() {
            setup.create_room(host).await;
            let created = setup
                .mock_conn_manager
                .consume_message_for(&conn(host))
                .await
                .expect("host should receive room-created");
            let created: serde_json::Value = serde_json::from_str(&created).unwrap();
            setup.room_id = created["roomId"].as_str().unwrap().to_string();
        }
        for player in players {
            let room_id = setup.room_id.clone();
            setup.join_room(player, &room_id).await;
        }

        setup.clear_messages().await;
        setup
    }
}
