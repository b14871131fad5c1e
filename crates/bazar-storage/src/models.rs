// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `bazar-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use bazar_core::types::{
    Delivery, DomainEvent, EntityKind, GeoPoint, Item, Notification, NotificationKind, Order,
    Recommendation, RecommendationReason, User, WishlistEntry,
};
