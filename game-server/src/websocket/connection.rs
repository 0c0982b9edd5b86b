use game_types::{Identity, ServerMessage, SessionEvent, SessionId};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Option<Identity>,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub session_id: Option<SessionId>,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let now = Instant::now();

        let connection = Self {
            id,
            identity: None,
            connected_at: now,
            last_activity: now,
            session_id: None,
            sender,
        };

        (connection, receiver)
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_inactive(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// Live WebSocket connections and the session each one is watching
pub struct ConnectionManager {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    identity_to_connection: RwLock<HashMap<Uuid, ConnectionId>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            identity_to_connection: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_connection(
        &self,
        id: ConnectionId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (conn, receiver) = Connection::new(id);

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, conn);
        }

        receiver
    }

    pub async fn remove_connection(&self, id: ConnectionId) {
        let identity_id = {
            let mut connections = self.connections.write().await;
            connections
                .remove(&id)
                .and_then(|conn| conn.identity.map(|identity| identity.id))
        };

        if let Some(identity_id) = identity_id {
            let mut identity_to_connection = self.identity_to_connection.write().await;
            // Only drop the mapping if it still points at this connection
            if identity_to_connection.get(&identity_id) == Some(&id) {
                identity_to_connection.remove(&identity_id);
            }
        }
    }

    pub async fn get_connection(&self, id: ConnectionId) -> Option<Connection> {
        let connections = self.connections.read().await;
        connections.get(&id).cloned()
    }

    /// Bind an identity to a connection. One live connection per identity.
    pub async fn authenticate_connection(
        &self,
        id: ConnectionId,
        identity: Identity,
    ) -> Result<(), String> {
        {
            let identity_to_connection = self.identity_to_connection.read().await;
            if identity_to_connection
                .get(&identity.id)
                .is_some_and(|existing| *existing != id)
            {
                return Err("Identity already connected".to_string());
            }
        }

        let identity_id = identity.id;
        {
            let mut connections = self.connections.write().await;
            match connections.get_mut(&id) {
                Some(connection) => connection.identity = Some(identity),
                None => return Err("Connection not found".to_string()),
            }
        }

        {
            let mut identity_to_connection = self.identity_to_connection.write().await;
            identity_to_connection.insert(identity_id, id);
        }

        Ok(())
    }

    pub async fn update_activity(&self, id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.update_activity();
        }
    }

    pub async fn send_to_connection(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), String> {
        let connections = self.connections.read().await;
        if let Some(connection) = connections.get(&id) {
            connection.send_message(message)
        } else {
            Err("Connection not found".to_string())
        }
    }

    /// Push events, in order, to every connection subscribed to the session
    pub async fn broadcast_to_session(&self, session_id: SessionId, events: &[SessionEvent]) {
        if events.is_empty() {
            return;
        }

        let connections = self.connections.read().await;
        let subscribers: Vec<&Connection> = connections
            .values()
            .filter(|conn| conn.session_id == Some(session_id))
            .collect();

        for event in events {
            let message = ServerMessage::SessionEvent {
                session_id: session_id.to_string(),
                event: event.clone(),
            };
            for connection in &subscribers {
                // A closed receiver is cleaned up by its own socket task
                let _ = connection.send_message(message.clone());
            }
        }
    }

    pub async fn cleanup_inactive_connections(&self, timeout: Duration) {
        let inactive_connections: Vec<ConnectionId> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .filter(|conn| conn.is_inactive(timeout))
                .map(|conn| conn.id)
                .collect()
        };

        for connection_id in inactive_connections {
            tracing::info!("Removing inactive connection: {}", connection_id);
            self.remove_connection(connection_id).await;
        }
    }

    pub async fn set_connection_session(&self, id: ConnectionId, session_id: Option<SessionId>) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.session_id = session_id;
        }
    }

    pub async fn get_connections_in_session(&self, session_id: SessionId) -> Vec<ConnectionId> {
        let connections = self.connections.read().await;
        connections
            .values()
            .filter(|conn| conn.session_id == Some(session_id))
            .map(|conn| conn.id)
            .collect()
    }

    // Test helper methods
    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }

    pub async fn identity_connection_count(&self) -> usize {
        let identity_connections = self.identity_to_connection.read().await;
        identity_connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn left_event() -> SessionEvent {
        SessionEvent::PlayerLeft {
            player_id: Uuid::new_v4(),
            remaining: 1,
        }
    }

    #[tokio::test]
    async fn test_connection_creation_and_removal() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();

        let _receiver = manager.create_connection(conn_id).await;
        assert_eq!(manager.connection_count().await, 1);

        manager.remove_connection(conn_id).await;
        assert_eq!(manager.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_rapid_connect_disconnect_cycles() {
        let manager = ConnectionManager::new();
        let mut connections = Vec::new();

        for _ in 0..100 {
            let conn_id = ConnectionId::new();
            let _receiver = manager.create_connection(conn_id).await;
            connections.push(conn_id);
        }

        assert_eq!(manager.connection_count().await, 100);

        for conn_id in connections {
            manager.remove_connection(conn_id).await;
        }

        assert_eq!(manager.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_authentication_prevents_duplicate_identities() {
        let manager = ConnectionManager::new();
        let conn_id1 = ConnectionId::new();
        let conn_id2 = ConnectionId::new();
        let identity = Identity::user(Uuid::new_v4(), "Ada");

        let _receiver1 = manager.create_connection(conn_id1).await;
        let _receiver2 = manager.create_connection(conn_id2).await;

        assert!(
            manager
                .authenticate_connection(conn_id1, identity.clone())
                .await
                .is_ok()
        );

        let result = manager.authenticate_connection(conn_id2, identity).await;
        assert_eq!(result.unwrap_err(), "Identity already connected");
        assert_eq!(manager.identity_connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_reauthenticating_same_connection_is_allowed() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();
        let identity = Identity::guest(Uuid::new_v4());

        let _receiver = manager.create_connection(conn_id).await;
        manager
            .authenticate_connection(conn_id, identity.clone())
            .await
            .unwrap();
        assert!(manager.authenticate_connection(conn_id, identity).await.is_ok());
    }

    #[tokio::test]
    async fn test_authentication_cleanup_on_disconnect() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();

        let _receiver = manager.create_connection(conn_id).await;
        manager
            .authenticate_connection(conn_id, Identity::guest(Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(manager.identity_connection_count().await, 1);

        manager.remove_connection(conn_id).await;
        assert_eq!(manager.connection_count().await, 0);
        assert_eq!(manager.identity_connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_activity_tracking_and_timeout() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();

        let _receiver = manager.create_connection(conn_id).await;

        let short_timeout = Duration::from_millis(10);
        manager.cleanup_inactive_connections(short_timeout).await;
        assert_eq!(manager.connection_count().await, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.cleanup_inactive_connections(short_timeout).await;
        assert_eq!(manager.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_message_sending_to_nonexistent_connection() {
        let manager = ConnectionManager::new();

        let result = manager
            .send_to_connection(
                ConnectionId::new(),
                ServerMessage::Error {
                    message: "test".to_string(),
                },
            )
            .await;

        assert_eq!(result.unwrap_err(), "Connection not found");
    }

    #[tokio::test]
    async fn test_message_sending_after_connection_close() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();

        let receiver = manager.create_connection(conn_id).await;
        drop(receiver);

        let result = manager
            .send_to_connection(
                conn_id,
                ServerMessage::Error {
                    message: "test".to_string(),
                },
            )
            .await;

        assert_eq!(result.unwrap_err(), "Connection closed");
    }

    #[tokio::test]
    async fn test_broadcast_reaches_only_subscribers() {
        let manager = ConnectionManager::new();
        let session_id = Uuid::new_v4();
        let (watching, other) = (ConnectionId::new(), ConnectionId::new());

        let mut watching_rx = manager.create_connection(watching).await;
        let mut other_rx = manager.create_connection(other).await;
        manager
            .set_connection_session(watching, Some(session_id))
            .await;
        manager
            .set_connection_session(other, Some(Uuid::new_v4()))
            .await;

        let events = vec![left_event(), left_event()];
        manager.broadcast_to_session(session_id, &events).await;

        for expected in &events {
            match watching_rx.try_recv() {
                Ok(ServerMessage::SessionEvent { session_id: id, event }) => {
                    assert_eq!(id, session_id.to_string());
                    assert_eq!(&event, expected);
                }
                other => panic!("Expected session event, got {:?}", other),
            }
        }
        assert!(other_rx.try_recv().is_err());
        assert_eq!(
            manager.get_connections_in_session(session_id).await,
            vec![watching]
        );
    }

    #[tokio::test]
    async fn test_concurrent_connection_operations() {
        let manager = std::sync::Arc::new(ConnectionManager::new());
        let mut handles = Vec::new();

        for _ in 0..50 {
            let manager_clone = manager.clone();
            let handle = tokio::spawn(async move {
                let conn_id = ConnectionId::new();
                let _receiver = manager_clone.create_connection(conn_id).await;

                tokio::time::sleep(Duration::from_millis(1)).await;

                manager_clone
                    .authenticate_connection(conn_id, Identity::guest(Uuid::new_v4()))
                    .await
                    .unwrap();
                manager_clone.remove_connection(conn_id).await;
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(manager.connection_count().await, 0);
        assert_eq!(manager.identity_connection_count().await, 0);
    }
}
