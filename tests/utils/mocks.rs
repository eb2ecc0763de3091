use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use skyjo::websockets::ConnectionManager;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every frame per connection id instead of writing to sockets
#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<String, VecDeque<String>>>>,
    connected: Arc<RwLock<Vec<String>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_connected(&self, connection_id: &str) {
        self.connected.write().await.push(connection_id.to_string());
    }

    pub async fn is_connected(&self, connection_id: &str) -> bool {
        self.connected
            .read()
            .await
            .iter()
            .any(|c| c == connection_id)
    }

    pub async fn get_messages_for(&self, connection_id: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(connection_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pops the oldest unread frame for a connection
    pub async fn consume_message_for(&self, connection_id: &str) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(connection_id)
            .and_then(|queue| queue.pop_front())
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection_id: String, _sender: mpsc::UnboundedSender<String>) {
        self.add_connected(&connection_id).await;
    }

    async fn remove_connection(&self, connection_id: &str) {
        self.connected.write().await.retain(|c| c != connection_id);
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(connection_id.to_string())
            .or_default()
            .push_back(message.to_string());
    }

    async fn send_to_connections(&self, connection_ids: &[String], message: &str) {
        for connection_id in connection_ids {
            self.send_to_connection(connection_id, message).await;
        }
    }
}
