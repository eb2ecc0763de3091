use serde_json::{json, Value};

use skyjo::websockets::MessageHandler;

use super::setup::{conn, TestSetup};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a raw text frame from a player's connection
    pub async fn send_raw(&self, pseudo: &str, frame: &str) {
        self.gateway
            .handle_message(&conn(pseudo), frame.to_string())
            .await;
    }

    /// Send a JSON intent from a player's connection
    pub async fn send(&self, pseudo: &str, intent: Value) {
        self.send_raw(pseudo, &intent.to_string()).await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    /// Simulate the connection dropping
    pub async fn disconnect(&self, pseudo: &str) {
        self.gateway.handle_disconnect(&conn(pseudo)).await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn create_room(&self, pseudo: &str) {
        self.send(pseudo, json!({"type": "create-room", "pseudo": pseudo}))
            .await;
    }

    pub async fn join_room(&self, pseudo: &str, room_id: &str) {
        self.send(
            pseudo,
            json!({"type": "join-room", "roomId": room_id, "pseudo": pseudo}),
        )
        .await;
    }

    pub async fn start_game(&self, pseudo: &str) {
        self.send(pseudo, json!({"type": "start-game"})).await;
    }

    pub async fn flip(&self, pseudo: &str, card_id: &str) {
        self.send(
            pseudo,
            json!({"type": "flip-card", "pseudo": pseudo, "cardId": card_id}),
        )
        .await;
    }

    pub async fn draw_card(&self, pseudo: &str) {
        self.send(pseudo, json!({"type": "draw-card"})).await;
    }

    pub async fn draw_from_discard(&self, pseudo: &str) {
        self.send(pseudo, json!({"type": "draw-from-discard", "pseudo": pseudo}))
            .await;
    }

    pub async fn replace_card(&self, pseudo: &str, old_card_id: &str) {
        self.send(
            pseudo,
            json!({"type": "replace-card", "pseudo": pseudo, "oldCardId": old_card_id}),
        )
        .await;
    }

    pub async fn discard_drawn_card(&self, pseudo: &str, from_discard: bool) {
        self.send(
            pseudo,
            json!({"type": "discard-drawn-card", "pseudo": pseudo, "fromDiscard": from_discard}),
        )
        .await;
    }

    pub async fn column_completed(&self, pseudo: &str, column: usize) {
        self.send(
            pseudo,
            json!({"type": "column-completed", "pseudo": pseudo, "column": column}),
        )
        .await;
    }

    pub async fn chat(&self, pseudo: &str, message: &str) {
        self.send(pseudo, json!({"type": "message", "message": message}))
            .await;
    }

    /// Starts the game and has every player reveal slots 0 and 1
    pub async fn launch_game(&self) {
        self.start_game(&self.players[0]).await;
        for pseudo in &self.players {
            self.flip(pseudo, &format!("{}-0", pseudo)).await;
            self.flip(pseudo, &format!("{}-1", pseudo)).await;
        }
    }

    /// Draw from the deck, discard it, reveal `slot`
    pub async fn play_flip_turn(&self, pseudo: &str, slot: usize) {
        self.draw_card(pseudo).await;
        self.discard_drawn_card(pseudo, false).await;
        self.flip(pseudo, &format!("{}-{}", pseudo, slot)).await;
    }

    // ============================================================================
    // Room inspection
    // ============================================================================

    pub async fn current_player(&self) -> Option<String> {
        let shared = self.rooms.get(&self.room_id).await?;
        let room = shared.lock().await;
        room.current_player().map(|p| p.pseudo().to_string())
    }

    pub async fn discard_len(&self) -> usize {
        let Some(shared) = self.rooms.get(&self.room_id).await else {
            return 0;
        };
        let room = shared.lock().await;
        room.discard_pile().len()
    }

    pub async fn deck_len(&self) -> usize {
        let Some(shared) = self.rooms.get(&self.room_id).await else {
            return 0;
        };
        let room = shared.lock().await;
        room.deck().remaining_count()
    }
}
