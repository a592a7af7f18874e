use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>);

    /// Drops the connection and its room memberships
    async fn remove_connection(&self, connection_id: &str);

    async fn join_room(&self, connection_id: &str, room_number: &str);

    async fn leave_room(&self, connection_id: &str, room_number: &str);

    async fn send_to_connection(&self, connection_id: &str, message: &str);

    async fn send_to_room(&self, room_number: &str, message: &str);
}

pub struct InMemoryConnectionManager {
    // connection id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
    // room number -> connection ids
    rooms: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: &str) {
        self.connections.write().await.remove(connection_id);

        let mut rooms = self.rooms.write().await;
        for members in rooms.values_mut() {
            members.remove(connection_id);
        }
        rooms.retain(|_, members| !members.is_empty());
    }

    async fn join_room(&self, connection_id: &str, room_number: &str) {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_number.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    async fn leave_room(&self, connection_id: &str, room_number: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(room_number) {
            members.remove(connection_id);
            if members.is_empty() {
                rooms.remove(room_number);
            }
        }
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(connection_id) {
            let _ = sender.send(message.to_string());
        }
    }

    async fn send_to_room(&self, room_number: &str, message: &str) {
        let rooms = self.rooms.read().await;
        let Some(members) = rooms.get(room_number) else {
            return;
        };

        let connections = self.connections.read().await;
        for connection_id in members {
            if let Some(sender) = connections.get(connection_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }
}
