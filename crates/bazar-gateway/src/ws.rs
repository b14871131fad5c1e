// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket ingress: handshake auth, typed message dispatch, cleanup.
//!
//! The credential arrives as a `?token=` query parameter. A connection
//! that fails verification is upgraded and immediately closed with an
//! unauthorized close code; it is never registered. Malformed inbound
//! payloads are logged and dropped without closing the connection.

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use bazar_core::wire::{ClientMessage, ServerMessage};
use bazar_realtime::registry::ConnectionHandle;

use crate::server::GatewayState;

/// RFC 6455 policy-violation close code, used for failed auth.
const CLOSE_UNAUTHORIZED: u16 = 1008;

/// Handshake query parameters.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// WebSocket upgrade handler. Verifies the token before registering
/// anything; a bad credential still gets an upgrade so the close code
/// reaches the client.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<GatewayState>,
) -> Response {
    let verified = state
        .auth
        .verifier
        .as_ref()
        .ok_or_else(|| {
            tracing::error!("gateway has no token key configured, rejecting connection");
        })
        .and_then(|verifier| {
            let token = query.token.as_deref().unwrap_or("");
            verifier.verify(token).map_err(|e| {
                tracing::debug!(error = %e, "rejected websocket handshake");
            })
        });

    match verified {
        Ok(user_id) => ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)),
        Err(()) => ws.on_upgrade(reject_socket),
    }
}

async fn reject_socket(mut socket: WebSocket) {
    let frame = CloseFrame {
        code: CLOSE_UNAUTHORIZED,
        reason: "unauthorized".into(),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

/// Handle one authenticated connection until it closes.
///
/// Spawns a writer task draining an mpsc channel into the socket; all
/// outbound traffic (acks and broadcasts alike) goes through that
/// channel so per-connection ordering is preserved.
async fn handle_socket(socket: WebSocket, state: GatewayState, user_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::channel::<String>(64);
    state.registry.register(
        &user_id,
        ConnectionHandle {
            id: connection_id.clone(),
            sender: tx.clone(),
        },
    );
    tracing::info!(%user_id, %connection_id, "websocket connected");

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    send(
        &tx,
        &ServerMessage::Connected {
            message: "connected to bazar realtime".to_string(),
            user_id: user_id.clone(),
        },
    )
    .await;

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let message: ClientMessage = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!(%user_id, error = %e, "dropping malformed websocket message");
                        continue;
                    }
                };
                dispatch(&state, &user_id, &connection_id, &tx, message).await;
            }
            Message::Close(_) => break,
            // Binary frames are not part of the protocol; ping/pong is
            // handled by the transport layer.
            _ => {}
        }
    }

    state.registry.unregister(&user_id, &connection_id);
    if !state.registry.has_connections(&user_id) {
        state.watchers.remove_user(&user_id);
    }
    sender_task.abort();
    tracing::info!(%user_id, %connection_id, "websocket disconnected");
}

async fn dispatch(
    state: &GatewayState,
    user_id: &str,
    connection_id: &str,
    tx: &mpsc::Sender<String>,
    message: ClientMessage,
) {
    match message {
        ClientMessage::Subscribe => {
            // Defensive re-registration; register() dedupes by id.
            state.registry.register(
                user_id,
                ConnectionHandle {
                    id: connection_id.to_string(),
                    sender: tx.clone(),
                },
            );
            send(
                tx,
                &ServerMessage::Subscribed {
                    user_id: user_id.to_string(),
                },
            )
            .await;
        }
        ClientMessage::Unsubscribe => {
            state.registry.unregister(user_id, connection_id);
        }
        ClientMessage::WatchDelivery { data } => {
            state.watchers.add_watcher(&data.delivery_id, user_id);
        }
        ClientMessage::LocationUpdate { data } => {
            if let Err(e) = state
                .pipeline
                .update_delivery_location(&data.delivery_id, data.latitude, data.longitude, user_id)
                .await
            {
                tracing::warn!(user_id, delivery_id = %data.delivery_id, error = %e,
                    "location update failed");
            }
        }
        ClientMessage::Ping => {
            send(tx, &ServerMessage::Pong).await;
        }
    }
}

async fn send(tx: &mpsc::Sender<String>, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            let _ = tx.send(json).await;
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode server message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use bazar_core::types::{Delivery, Order};
    use bazar_core::wire::{LocationUpdateData, WatchDeliveryData};
    use bazar_realtime::{Broadcaster, ConnectionRegistry, DeliveryWatcherIndex, StatusPipeline};
    use bazar_recommend::RecommendationEngine;
    use bazar_storage::{queries, Database};

    const STAMP: &str = "2026-01-01T00:00:00+00:00";

    async fn make_state() -> GatewayState {
        let db = Database::open_in_memory().await.unwrap();
        let registry = ConnectionRegistry::new();
        let watchers = DeliveryWatcherIndex::new();
        let broadcaster = Broadcaster::new(registry.clone(), watchers.clone());
        GatewayState {
            db: db.clone(),
            registry,
            watchers,
            pipeline: StatusPipeline::new(db.clone(), broadcaster),
            engine: RecommendationEngine::new(db),
            auth: AuthState { verifier: None },
        }
    }

    fn connect(state: &GatewayState, user_id: &str, connection_id: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(8);
        state.registry.register(
            user_id,
            ConnectionHandle {
                id: connection_id.to_string(),
                sender: tx,
            },
        );
        rx
    }

    #[tokio::test]
    async fn ping_replies_pong_without_mutating_state() {
        let state = make_state().await;
        let mut registered_rx = connect(&state, "u-1", "c-1");
        let (tx, mut rx) = mpsc::channel(8);

        dispatch(&state, "u-1", "c-1", &tx, ClientMessage::Ping).await;

        assert_eq!(rx.recv().await.unwrap(), r#"{"type":"pong"}"#);
        // The reply goes through the connection's own channel; the
        // registry and watcher index are untouched.
        assert_eq!(state.registry.connection_count("u-1"), 1);
        assert!(state.watchers.watchers("d-1").is_empty());
        assert!(registered_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn subscribe_registers_and_acks() {
        let state = make_state().await;
        let (tx, mut rx) = mpsc::channel(8);

        dispatch(&state, "u-1", "c-1", &tx, ClientMessage::Subscribe).await;

        assert_eq!(state.registry.connection_count("u-1"), 1);
        assert_eq!(
            rx.recv().await.unwrap(),
            r#"{"type":"subscribed","userId":"u-1"}"#
        );
    }

    #[tokio::test]
    async fn unsubscribe_detaches_the_connection() {
        let state = make_state().await;
        let _rx = connect(&state, "u-1", "c-1");
        let (tx, _reply_rx) = mpsc::channel(8);

        dispatch(&state, "u-1", "c-1", &tx, ClientMessage::Unsubscribe).await;

        assert!(!state.registry.has_connections("u-1"));
    }

    #[tokio::test]
    async fn watch_delivery_adds_the_caller_as_watcher() {
        let state = make_state().await;
        let (tx, _reply_rx) = mpsc::channel(8);

        let message = ClientMessage::WatchDelivery {
            data: WatchDeliveryData {
                delivery_id: "d-1".to_string(),
            },
        };
        dispatch(&state, "u-1", "c-1", &tx, message).await;

        assert!(state.watchers.watchers("d-1").contains("u-1"));
    }

    #[tokio::test]
    async fn location_update_runs_the_pipeline() {
        let state = make_state().await;
        queries::orders::create_order(
            &state.db,
            &Order {
                id: "o-1".to_string(),
                buyer_id: "buyer-1".to_string(),
                status: "pending".to_string(),
                created_at: STAMP.to_string(),
                updated_at: STAMP.to_string(),
            },
        )
        .await
        .unwrap();
        queries::deliveries::create_delivery(
            &state.db,
            &Delivery {
                id: "d-1".to_string(),
                order_id: "o-1".to_string(),
                rider_id: Some("rider-1".to_string()),
                status: "in_transit".to_string(),
                current_location: None,
                location_updated_at: None,
                created_at: STAMP.to_string(),
            },
        )
        .await
        .unwrap();

        let (tx, _reply_rx) = mpsc::channel(8);
        let message = ClientMessage::LocationUpdate {
            data: LocationUpdateData {
                delivery_id: "d-1".to_string(),
                latitude: 6.5,
                longitude: 3.3,
            },
        };
        dispatch(&state, "rider-1", "c-1", &tx, message).await;

        let delivery = queries::deliveries::get_delivery(&state.db, "d-1")
            .await
            .unwrap()
            .unwrap();
        let location = delivery.current_location.unwrap();
        assert_eq!(location.latitude, 6.5);
        assert_eq!(location.longitude, 3.3);
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected_before_dispatch() {
        let state = make_state().await;
        let _rx = connect(&state, "u-1", "c-1");

        // The receive loop drops anything that fails to parse and keeps
        // the connection; nothing reaches dispatch.
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());

        assert_eq!(state.registry.connection_count("u-1"), 1);
    }

    #[test]
    fn ws_query_token_is_optional() {
        let query: WsQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert!(query.token.is_none());

        let query: WsQuery = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(query.token.as_deref(), Some("abc"));
    }

    #[test]
    fn unauthorized_close_code_is_policy_violation() {
        assert_eq!(CLOSE_UNAUTHORIZED, 1008);
    }
}
