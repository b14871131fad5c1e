// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound broadcast surface used by the status pipelines.
//!
//! Wraps the registry and watcher index behind the three message shapes
//! the rest of the system pushes: order status to the buyer, delivery
//! updates to watchers (or directly to one user), and notifications.

use bazar_core::{
    wire::{DeliveryUpdateData, OrderStatusData, ServerMessage},
    BazarError, GeoPoint, Notification,
};

use crate::registry::ConnectionRegistry;
use crate::watchers::DeliveryWatcherIndex;

#[derive(Clone)]
pub struct Broadcaster {
    registry: ConnectionRegistry,
    watchers: DeliveryWatcherIndex,
}

impl Broadcaster {
    pub fn new(registry: ConnectionRegistry, watchers: DeliveryWatcherIndex) -> Self {
        Self { registry, watchers }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn watchers(&self) -> &DeliveryWatcherIndex {
        &self.watchers
    }

    /// Push an `order_status` message to the buyer's connections only.
    pub fn broadcast_order_update(
        &self,
        order_id: &str,
        status: &str,
        buyer_id: &str,
    ) -> Result<usize, BazarError> {
        let message = ServerMessage::OrderStatus {
            data: OrderStatusData {
                order_id: order_id.to_string(),
                status: status.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        };
        self.registry.send_to_user(buyer_id, &message)
    }

    /// Push a `delivery_update` to every registered watcher of the delivery.
    pub fn broadcast_delivery_update(
        &self,
        delivery_id: &str,
        status: &str,
        location: Option<GeoPoint>,
    ) -> Result<usize, BazarError> {
        let message = delivery_update(delivery_id, status, location);
        self.watchers
            .broadcast_to_watchers(delivery_id, &message, &self.registry)
    }

    /// Push a `delivery_update` directly to one user, bypassing the
    /// watcher index. Used for the buyer of the delivery's parent order.
    pub fn send_delivery_update_to_user(
        &self,
        user_id: &str,
        delivery_id: &str,
        status: &str,
        location: Option<GeoPoint>,
    ) -> Result<usize, BazarError> {
        let message = delivery_update(delivery_id, status, location);
        self.registry.send_to_user(user_id, &message)
    }

    /// Push a freshly created notification to its user's connections.
    pub fn broadcast_notification(
        &self,
        user_id: &str,
        notification: &Notification,
    ) -> Result<usize, BazarError> {
        let message = ServerMessage::Notification {
            data: notification.clone(),
        };
        self.registry.send_to_user(user_id, &message)
    }
}

fn delivery_update(delivery_id: &str, status: &str, location: Option<GeoPoint>) -> ServerMessage {
    ServerMessage::DeliveryUpdate {
        data: DeliveryUpdateData {
            delivery_id: delivery_id.to_string(),
            status: status.to_string(),
            location,
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectionHandle;
    use bazar_core::NotificationKind;
    use tokio::sync::mpsc;

    fn wired_broadcaster(user_id: &str) -> (Broadcaster, mpsc::Receiver<String>) {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::channel(8);
        registry.register(
            user_id,
            ConnectionHandle {
                id: "c-1".to_string(),
                sender: tx,
            },
        );
        (
            Broadcaster::new(registry, DeliveryWatcherIndex::new()),
            rx,
        )
    }

    #[tokio::test]
    async fn order_update_targets_only_the_buyer() {
        let (broadcaster, mut rx) = wired_broadcaster("buyer-1");

        let delivered = broadcaster
            .broadcast_order_update("o-1", "shipped", "buyer-1")
            .unwrap();
        assert_eq!(delivered, 1);
        let json = rx.recv().await.unwrap();
        assert!(json.contains("\"type\":\"order_status\""));
        assert!(json.contains("\"orderId\":\"o-1\""));
        assert!(json.contains("\"status\":\"shipped\""));

        let none = broadcaster
            .broadcast_order_update("o-1", "shipped", "somebody-else")
            .unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn delivery_update_reaches_watchers() {
        let (broadcaster, mut rx) = wired_broadcaster("watcher-1");
        broadcaster.watchers().add_watcher("d-1", "watcher-1");

        let delivered = broadcaster
            .broadcast_delivery_update(
                "d-1",
                "in_transit",
                Some(GeoPoint {
                    latitude: 6.5,
                    longitude: 3.3,
                }),
            )
            .unwrap();
        assert_eq!(delivered, 1);
        let json = rx.recv().await.unwrap();
        assert!(json.contains("\"type\":\"delivery_update\""));
        assert!(json.contains("\"deliveryId\":\"d-1\""));
        assert!(json.contains("\"latitude\":6.5"));
    }

    #[tokio::test]
    async fn direct_delivery_update_bypasses_watcher_index() {
        let (broadcaster, mut rx) = wired_broadcaster("buyer-1");

        let delivered = broadcaster
            .send_delivery_update_to_user("buyer-1", "d-1", "in_transit", None)
            .unwrap();
        assert_eq!(delivered, 1);
        let json = rx.recv().await.unwrap();
        assert!(json.contains("\"deliveryId\":\"d-1\""));
        assert!(!json.contains("location"), "absent location is omitted");
    }

    #[tokio::test]
    async fn notification_reaches_its_user() {
        let (broadcaster, mut rx) = wired_broadcaster("u-1");
        let notification = Notification {
            id: "n-1".to_string(),
            user_id: "u-1".to_string(),
            kind: NotificationKind::Order,
            title: "Order Update".to_string(),
            message: "Your order status is now shipped".to_string(),
            order_id: Some("o-1".to_string()),
            delivery_id: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        };

        broadcaster.broadcast_notification("u-1", &notification).unwrap();
        let json = rx.recv().await.unwrap();
        assert!(json.contains("\"type\":\"notification\""));
        assert!(json.contains("\"title\":\"Order Update\""));
    }
}
