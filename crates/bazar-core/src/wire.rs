// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket wire messages.
//!
//! Client -> Server (JSON, discriminated by `type`):
//! ```json
//! {"type": "subscribe"}
//! {"type": "watch_delivery", "data": {"deliveryId": "d-1"}}
//! {"type": "location_update", "data": {"deliveryId": "d-1", "latitude": 6.5, "longitude": 3.3}}
//! {"type": "ping"}
//! ```
//!
//! Server -> Client:
//! ```json
//! {"type": "connected", "message": "...", "userId": "u-1"}
//! {"type": "order_status", "data": {"orderId": "o-1", "status": "shipped", "timestamp": "..."}}
//! {"type": "pong"}
//! ```
//!
//! Both directions are closed tagged enums so adding a message type is a
//! compile-time-checked change. Unknown `type` tags fail deserialization;
//! the gateway logs and drops them without closing the connection.

use serde::{Deserialize, Serialize};

use crate::types::{GeoPoint, Notification};

/// Payload of a `watch_delivery` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchDeliveryData {
    #[serde(rename = "deliveryId")]
    pub delivery_id: String,
}

/// Payload of a `location_update` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdateData {
    #[serde(rename = "deliveryId")]
    pub delivery_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Message from a connected client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Defensive re-registration; replied to with `subscribed`.
    Subscribe,
    /// Detach this connection from the registry.
    Unsubscribe,
    /// Start watching a delivery for targeted updates.
    WatchDelivery { data: WatchDeliveryData },
    /// Rider position report for a delivery.
    LocationUpdate { data: LocationUpdateData },
    /// Liveness check; replied to with `pong`, no state mutation.
    Ping,
}

/// Payload of an `order_status` broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusData {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub status: String,
    pub timestamp: String,
}

/// Payload of a `delivery_update` broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryUpdateData {
    #[serde(rename = "deliveryId")]
    pub delivery_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub timestamp: String,
}

/// Message sent to a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake acknowledgement carrying the authenticated user id.
    Connected {
        message: String,
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Reply to `subscribe`.
    Subscribed {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Reply to `ping`.
    Pong,
    /// Order status change pushed to the buyer.
    OrderStatus { data: OrderStatusData },
    /// Delivery status/position pushed to watchers or the buyer.
    DeliveryUpdate { data: DeliveryUpdateData },
    /// A freshly created notification pushed to its user.
    Notification { data: Notification },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_parses_ping() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn client_message_parses_watch_delivery() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"watch_delivery","data":{"deliveryId":"d-1"}}"#)
                .unwrap();
        match msg {
            ClientMessage::WatchDelivery { data } => assert_eq!(data.delivery_id, "d-1"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn client_message_parses_location_update() {
        let json = r#"{"type":"location_update","data":{"deliveryId":"d-2","latitude":6.5,"longitude":3.3}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::LocationUpdate { data } => {
                assert_eq!(data.delivery_id, "d-2");
                assert_eq!(data.latitude, 6.5);
                assert_eq!(data.longitude, 3.3);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"watch_delivery"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn server_message_serializes_connected() {
        let msg = ServerMessage::Connected {
            message: "connected".to_string(),
            user_id: "u-1".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"userId\":\"u-1\""));
    }

    #[test]
    fn delivery_update_omits_absent_location() {
        let msg = ServerMessage::DeliveryUpdate {
            data: DeliveryUpdateData {
                delivery_id: "d-1".to_string(),
                status: "in_transit".to_string(),
                location: None,
                timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("location"));
    }
}
