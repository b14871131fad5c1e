// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status-change pipelines: persist the mutation, record the side effects,
//! push live updates.
//!
//! Each pipeline runs its steps in a fixed order per call: persist, then
//! notification, then event append, then broadcast. A missing entity is a
//! tagged outcome, not an error. Notification and broadcast failures are
//! logged and absorbed so a flaky socket can never fail a status update;
//! persistence and event-append failures propagate.

use bazar_core::{
    BazarError, Delivery, DomainEvent, EntityKind, GeoPoint, Notification, NotificationKind, Order,
};
use bazar_storage::{
    queries::{deliveries, events, notifications, orders},
    Database,
};

use crate::broadcast::Broadcaster;

/// Result of a status update against an entity that may not exist.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    Updated(T),
    NotFound,
}

impl<T> UpdateOutcome<T> {
    pub fn updated(self) -> Option<T> {
        match self {
            UpdateOutcome::Updated(v) => Some(v),
            UpdateOutcome::NotFound => None,
        }
    }
}

#[derive(Clone)]
pub struct StatusPipeline {
    db: Database,
    broadcaster: Broadcaster,
}

impl StatusPipeline {
    pub fn new(db: Database, broadcaster: Broadcaster) -> Self {
        Self { db, broadcaster }
    }

    /// Change an order's status and fan out the side effects to the buyer.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        new_status: &str,
        updated_by: Option<&str>,
    ) -> Result<UpdateOutcome<Order>, BazarError> {
        let now = chrono::Utc::now().to_rfc3339();
        let Some(order) = orders::set_status(&self.db, order_id, new_status, &now).await? else {
            tracing::debug!(order_id, "status update for unknown order, nothing to do");
            return Ok(UpdateOutcome::NotFound);
        };

        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: order.buyer_id.clone(),
            kind: NotificationKind::Order,
            title: "Order Update".to_string(),
            message: format!("Your order status is now {new_status}"),
            order_id: Some(order.id.clone()),
            delivery_id: None,
            created_at: now.clone(),
        };
        if let Err(e) = notifications::create_notification(&self.db, &notification).await {
            tracing::warn!(order_id, error = %e, "failed to persist order notification");
        } else if let Err(e) = self
            .broadcaster
            .broadcast_notification(&order.buyer_id, &notification)
        {
            tracing::warn!(order_id, error = %e, "failed to push order notification");
        }

        let event = DomainEvent {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: "order_status".to_string(),
            entity_id: order.id.clone(),
            entity_kind: EntityKind::Order,
            user_id: Some(order.buyer_id.clone()),
            data: serde_json::json!({
                "orderId": order.id,
                "newStatus": new_status,
                "updatedBy": updated_by,
            })
            .to_string(),
            processed: false,
            created_at: now,
        };
        events::append_event(&self.db, &event).await?;

        if let Err(e) = self
            .broadcaster
            .broadcast_order_update(&order.id, new_status, &order.buyer_id)
        {
            tracing::warn!(order_id, error = %e, "failed to push order status update");
        }

        Ok(UpdateOutcome::Updated(order))
    }

    /// Record a rider's position for a delivery and fan the update out to
    /// the delivery's watchers and the parent order's buyer.
    pub async fn update_delivery_location(
        &self,
        delivery_id: &str,
        latitude: f64,
        longitude: f64,
        rider_id: &str,
    ) -> Result<UpdateOutcome<Delivery>, BazarError> {
        let now = chrono::Utc::now().to_rfc3339();
        let location = GeoPoint {
            latitude,
            longitude,
        };
        let Some(delivery) =
            deliveries::set_location(&self.db, delivery_id, location, &now).await?
        else {
            tracing::debug!(delivery_id, "location update for unknown delivery, nothing to do");
            return Ok(UpdateOutcome::NotFound);
        };

        let event = DomainEvent {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: "location_update".to_string(),
            entity_id: delivery.id.clone(),
            entity_kind: EntityKind::Delivery,
            user_id: Some(rider_id.to_string()),
            data: serde_json::json!({
                "deliveryId": delivery.id,
                "latitude": latitude,
                "longitude": longitude,
                "riderId": rider_id,
            })
            .to_string(),
            processed: false,
            created_at: now,
        };
        events::append_event(&self.db, &event).await?;

        if let Err(e) = self.broadcaster.broadcast_delivery_update(
            &delivery.id,
            &delivery.status,
            Some(location),
        ) {
            tracing::warn!(delivery_id, error = %e, "failed to push delivery update to watchers");
        }

        // Second, buyer-specific path: the parent order's buyer gets the
        // update whether or not they ever watched the delivery.
        match orders::get_order(&self.db, &delivery.order_id).await? {
            Some(order) => {
                if let Err(e) = self.broadcaster.send_delivery_update_to_user(
                    &order.buyer_id,
                    &delivery.id,
                    &delivery.status,
                    Some(location),
                ) {
                    tracing::warn!(delivery_id, error = %e, "failed to push delivery update to buyer");
                }
            }
            None => {
                tracing::warn!(delivery_id, order_id = %delivery.order_id, "delivery references missing order");
            }
        }

        Ok(UpdateOutcome::Updated(delivery))
    }
}
