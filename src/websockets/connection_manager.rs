use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Outbound side of every live connection, keyed by connection id
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, connection_id: &str);

    async fn send_to_connection(&self, connection_id: &str, message: &str);

    async fn send_to_connections(&self, connection_ids: &[String], message: &str);
}

#[derive(Default)]
pub struct InMemoryConnectionManager {
    // connection id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: &str) {
        let mut connections = self.connections.write().await;
        connections.remove(connection_id);
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(connection_id) {
            if sender.send(message.to_string()).is_err() {
                debug!(connection_id = %connection_id, "Dropping frame for closed connection");
            }
        }
    }

    async fn send_to_connections(&self, connection_ids: &[String], message: &str) {
        let connections = self.connections.read().await;
        for connection_id in connection_ids {
            if let Some(sender) = connections.get(connection_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_reaches_only_addressed_connections() {
        let manager = InMemoryConnectionManager::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        manager.add_connection("a".to_string(), tx_a).await;
        manager.add_connection("b".to_string(), tx_b).await;

        manager.send_to_connection("a", "hello").await;
        manager
            .send_to_connections(&["a".to_string(), "b".to_string(), "ghost".to_string()], "all")
            .await;

        assert_eq!(rx_a.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx_a.recv().await.as_deref(), Some("all"));
        assert_eq!(rx_b.recv().await.as_deref(), Some("all"));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_removed_connection_gets_nothing() {
        let manager = InMemoryConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.add_connection("a".to_string(), tx).await;
        manager.remove_connection("a").await;

        manager.send_to_connection("a", "late").await;

        assert_eq!(manager.connection_count().await, 0);
        // The manager held the only sender, so the channel is now closed
        assert_eq!(rx.recv().await, None);
    }
}
