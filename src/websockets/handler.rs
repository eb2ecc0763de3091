use async_trait::async_trait;
use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::game::{resolve, Delivery, GameAction, GameEngine, GameError, ServerEvent};
use crate::room::{Admission, RegistryError, RoomRegistry};
use crate::session::{Session, SessionRepository};
use crate::shared::AppState;

use super::connection_manager::ConnectionManager;
use super::messages::{encode, ClientIntent, Routed};
use super::socket::{Connection, MessageHandler};

/// Turns inbound frames into room actions and routes the resulting events
/// back out to the right connections.
///
/// A room stays locked from the moment an action is applied until its events
/// have been handed to the connection manager, so every client sees one
/// room's events in the order they were produced.
pub struct GameGateway {
    rooms: Arc<RoomRegistry>,
    sessions: Arc<dyn SessionRepository>,
    connections: Arc<dyn ConnectionManager>,
    engine: GameEngine,
}

impl GameGateway {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        sessions: Arc<dyn SessionRepository>,
        connections: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            rooms,
            sessions,
            connections,
            engine: GameEngine::new(),
        }
    }

    async fn deliver(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match encode(&delivery.event) {
                Ok(frame) => {
                    self.connections
                        .send_to_connections(&delivery.connection_ids, &frame)
                        .await
                }
                Err(e) => error!(event = delivery.event.name(), error = %e, "Failed to encode event"),
            }
        }
    }

    async fn reply_error(&self, connection_id: &str, message: impl Display) {
        let event = ServerEvent::error(message.to_string());
        match encode(&event) {
            Ok(frame) => self.connections.send_to_connection(connection_id, &frame).await,
            Err(e) => error!(error = %e, "Failed to encode error event"),
        }
    }

    async fn enter_room(
        &self,
        connection_id: &str,
        admit: impl std::future::Future<Output = Result<Admission, RegistryError>>,
    ) {
        if let Some(session) = self.sessions.get(connection_id).await {
            warn!(
                connection_id = %connection_id,
                room_id = %session.room_id,
                "Connection tried to enter a second room"
            );
            self.reply_error(connection_id, "You are already in a room").await;
            return;
        }

        let admission = match admit.await {
            Ok(admission) => admission,
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "Room entry rejected");
                self.reply_error(connection_id, e).await;
                return;
            }
        };

        let session = Session::new(connection_id, &admission.room_id, &admission.pseudo);
        if let Err(e) = self.sessions.bind(session).await {
            warn!(connection_id = %connection_id, error = %e, "Session bind failed, undoing entry");
            self.rooms
                .remove_player(&admission.room_id, &admission.pseudo)
                .await;
            self.reply_error(connection_id, e).await;
            return;
        }
        self.deliver(admission.deliveries).await;
    }

    async fn act(&self, connection_id: &str, claimed_pseudo: Option<String>, action: GameAction) {
        let Some(session) = self.sessions.get(connection_id).await else {
            warn!(
                connection_id = %connection_id,
                error = %GameError::NoSession,
                "Ignoring in-room intent from a connection without a room"
            );
            return;
        };

        if let Some(claimed) = claimed_pseudo.filter(|claimed| *claimed != session.pseudo) {
            warn!(
                room_id = %session.room_id,
                pseudo = %session.pseudo,
                claimed = %claimed,
                "Intent names another player"
            );
            self.reply_error(connection_id, GameError::ActingForOtherPlayer(claimed))
                .await;
            return;
        }

        let Some(shared) = self.rooms.get(&session.room_id).await else {
            warn!(room_id = %session.room_id, "Session points at a room that no longer exists");
            return;
        };
        let mut room = shared.lock().await;

        match self.engine.apply(&mut room, &session.pseudo, action) {
            Ok(outbounds) => {
                let deliveries = resolve(&room, outbounds);
                self.deliver(deliveries).await;
            }
            Err(e) => {
                warn!(
                    room_id = %session.room_id,
                    pseudo = %session.pseudo,
                    kind = %e.kind(),
                    error = %e,
                    "Intent rejected"
                );
                self.reply_error(connection_id, e).await;
            }
        }
    }
}

#[async_trait]
impl MessageHandler for GameGateway {
    #[instrument(skip(self, message))]
    async fn handle_message(&self, connection_id: &str, message: String) {
        let intent = match ClientIntent::decode(&message) {
            Ok(intent) => intent,
            Err(e) => {
                warn!(error = %e, "Failed to parse client message");
                self.reply_error(connection_id, format!("Malformed message: {}", e))
                    .await;
                return;
            }
        };
        debug!(intent = intent.name(), "Received intent");

        match Routed::from(intent) {
            Routed::CreateRoom { pseudo } => {
                self.enter_room(connection_id, self.rooms.create_room(&pseudo, connection_id))
                    .await
            }
            Routed::JoinRoom { room_id, pseudo } => {
                self.enter_room(
                    connection_id,
                    self.rooms.join_room(&room_id, &pseudo, connection_id),
                )
                .await
            }
            Routed::InRoom {
                claimed_pseudo,
                action,
            } => self.act(connection_id, claimed_pseudo, action).await,
            Routed::Ignored { intent } => debug!(intent, "Ignoring legacy intent"),
        }
    }

    #[instrument(skip(self))]
    async fn handle_disconnect(&self, connection_id: &str) {
        let Some(session) = self.sessions.remove(connection_id).await else {
            debug!("Connection closed before entering a room");
            return;
        };

        let deliveries = self
            .rooms
            .remove_player(&session.room_id, &session.pseudo)
            .await;
        self.deliver(deliveries).await;
    }
}

/// WebSocket endpoint
/// GET /ws - every connection gets a fresh connection id
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let connection_id = Uuid::new_v4().to_string();
    info!(connection_id = %connection_id, "WebSocket connection requested");

    ws.on_upgrade(move |socket| handle_websocket_connection(socket, connection_id, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: WebSocket, connection_id: String, app_state: AppState) {
    info!(connection_id = %connection_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let message_handler: Arc<dyn MessageHandler> = app_state.gateway.clone();
    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => info!(connection_id = %connection_id, "WebSocket connection closed cleanly"),
        Err(e) => warn!(connection_id = %connection_id, error = %e, "WebSocket connection error"),
    }

    // Cleanup: stop routing frames here, then leave the room
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
    app_state.gateway.handle_disconnect(&connection_id).await;
}
