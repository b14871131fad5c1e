// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide registry of open WebSocket connections, keyed by user.
//!
//! A user may hold several simultaneous connections (phone + browser tab).
//! Sends are fire-and-forget: a connection whose channel is full or closed
//! is skipped, never awaited.

use std::sync::Arc;

use bazar_core::{wire::ServerMessage, BazarError};
use dashmap::DashMap;
use tokio::sync::mpsc;

/// One registered connection: its id plus the channel its writer task
/// drains into the socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: String,
    pub sender: mpsc::Sender<String>,
}

/// Map of user id to that user's open connections.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<String, Vec<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under its authenticated user. Re-registering
    /// the same connection id is a no-op.
    pub fn register(&self, user_id: &str, handle: ConnectionHandle) {
        let mut entry = self.connections.entry(user_id.to_string()).or_default();
        if !entry.iter().any(|h| h.id == handle.id) {
            entry.push(handle);
        }
    }

    /// Remove one connection. When it was the user's last, the whole map
    /// entry goes too, so `has_connections` stays accurate.
    pub fn unregister(&self, user_id: &str, connection_id: &str) {
        if let Some(mut entry) = self.connections.get_mut(user_id) {
            entry.retain(|h| h.id != connection_id);
        }
        // Emptiness is re-checked under the entry lock, so a register that
        // lands between the retain and here keeps its connection.
        self.connections
            .remove_if(user_id, |_, handles| handles.is_empty());
    }

    /// Send a message to every open connection of one user. Serializes
    /// once and returns how many connections accepted it; stalled or
    /// closed connections are skipped.
    pub fn send_to_user(
        &self,
        user_id: &str,
        message: &ServerMessage,
    ) -> Result<usize, BazarError> {
        let json = serde_json::to_string(message).map_err(|e| BazarError::Channel {
            message: format!("failed to encode server message: {e}"),
            source: Some(Box::new(e)),
        })?;

        let Some(entry) = self.connections.get(user_id) else {
            return Ok(0);
        };
        let mut delivered = 0;
        for handle in entry.iter() {
            if handle.sender.try_send(json.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(user_id, connection_id = %handle.id, "skipping stalled connection");
            }
        }
        Ok(delivered)
    }

    /// Whether the user currently has at least one open connection.
    pub fn has_connections(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }

    /// Number of open connections for one user.
    pub fn connection_count(&self, user_id: &str) -> usize {
        self.connections.get(user_id).map_or(0, |e| e.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: &str) -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (
            ConnectionHandle {
                id: id.to_string(),
                sender: tx,
            },
            rx,
        )
    }

    #[tokio::test]
    async fn send_reaches_every_connection_of_the_user() {
        let registry = ConnectionRegistry::new();
        let (h1, mut rx1) = handle("c-1");
        let (h2, mut rx2) = handle("c-2");
        registry.register("u-1", h1);
        registry.register("u-1", h2);

        let delivered = registry.send_to_user("u-1", &ServerMessage::Pong).unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(rx1.recv().await.unwrap(), r#"{"type":"pong"}"#);
        assert_eq!(rx2.recv().await.unwrap(), r#"{"type":"pong"}"#);
    }

    #[tokio::test]
    async fn send_to_unknown_user_is_a_noop() {
        let registry = ConnectionRegistry::new();
        let delivered = registry.send_to_user("nobody", &ServerMessage::Pong).unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn unregister_last_connection_removes_the_entry() {
        let registry = ConnectionRegistry::new();
        let (h1, _rx1) = handle("c-1");
        let (h2, _rx2) = handle("c-2");
        registry.register("u-1", h1);
        registry.register("u-1", h2);

        registry.unregister("u-1", "c-1");
        assert!(registry.has_connections("u-1"));
        assert_eq!(registry.connection_count("u-1"), 1);

        registry.unregister("u-1", "c-2");
        assert!(!registry.has_connections("u-1"));
    }

    #[tokio::test]
    async fn reregistering_same_connection_id_does_not_duplicate() {
        let registry = ConnectionRegistry::new();
        let (h, _rx) = handle("c-1");
        registry.register("u-1", h.clone());
        registry.register("u-1", h);
        assert_eq!(registry.connection_count("u-1"), 1);
    }

    #[test]
    fn register_racing_an_unregister_is_never_lost() {
        for _ in 0..64 {
            let registry = ConnectionRegistry::new();
            let (h1, _rx1) = handle("c-1");
            let (h2, _rx2) = handle("c-2");
            registry.register("u-1", h1);

            let a = registry.clone();
            let b = registry.clone();
            let t1 = std::thread::spawn(move || a.unregister("u-1", "c-1"));
            let t2 = std::thread::spawn(move || b.register("u-1", h2));
            t1.join().unwrap();
            t2.join().unwrap();

            assert!(registry.has_connections("u-1"));
            assert_eq!(registry.connection_count("u-1"), 1);
        }
    }

    #[tokio::test]
    async fn closed_connection_is_skipped_not_an_error() {
        let registry = ConnectionRegistry::new();
        let (h1, rx1) = handle("c-dead");
        let (h2, mut rx2) = handle("c-live");
        registry.register("u-1", h1);
        registry.register("u-1", h2);
        drop(rx1);

        let delivered = registry.send_to_user("u-1", &ServerMessage::Pong).unwrap();
        assert_eq!(delivered, 1);
        assert!(rx2.recv().await.is_some());
    }
}
