// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Bazar workspace.
//!
//! Timestamps are RFC 3339 strings throughout; the stores stamp them with
//! `chrono::Utc::now().to_rfc3339()` so the wire format and the database
//! format agree byte-for-byte.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// An order placed by a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A geographic point reported by a rider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A delivery attached to an order, optionally assigned to a rider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub order_id: String,
    pub rider_id: Option<String>,
    pub status: String,
    /// Last reported rider position, if any.
    pub current_location: Option<GeoPoint>,
    /// Server-stamped time of the last location update.
    pub location_updated_at: Option<String>,
    pub created_at: String,
}

/// A catalog item, carrying the signals the recommendation engine scores on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub review_count: i64,
    pub created_at: String,
}

/// A wishlist entry linking a user to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub user_id: String,
    pub item_id: String,
    pub created_at: String,
}

/// A marketplace user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub created_at: String,
}

/// The kind of entity a domain event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    Delivery,
    User,
}

/// An append-only domain event, persisted for audit and replay.
///
/// Nothing mutates a stored event except the `processed` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: String,
    pub event_type: String,
    pub entity_id: String,
    pub entity_kind: EntityKind,
    pub user_id: Option<String>,
    /// Event payload, stored as a JSON string.
    pub data: String,
    pub processed: bool,
    pub created_at: String,
}

/// Category of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Delivery,
    Payment,
    System,
    Recommendation,
}

/// A durable per-user notification record.
///
/// Read/unread state is a downstream concern and is not modeled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub order_id: Option<String>,
    pub delivery_id: Option<String>,
    pub created_at: String,
}

/// Which candidate source produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    CategoryMatch,
    Rating,
    PriceRange,
    Trending,
}

/// A persisted recommendation, unique per `(user_id, item_id)`.
///
/// Regeneration upserts score and reason; `viewed` flips true only via an
/// explicit mark-viewed call and is never reset by regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub user_id: String,
    pub item_id: String,
    pub score: f64,
    pub reason: RecommendationReason,
    pub viewed: bool,
    pub created_at: String,
}
