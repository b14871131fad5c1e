// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Bazar marketplace realtime core.
//!
//! This crate provides the shared domain types, WebSocket wire messages, and
//! the workspace-wide error type. Every other crate in the workspace builds
//! on these definitions.

pub mod error;
pub mod types;
pub mod wire;

// Re-export key items at crate root for ergonomic imports.
pub use error::BazarError;
pub use types::{
    Delivery, DomainEvent, EntityKind, GeoPoint, Item, Notification, NotificationKind, Order,
    Recommendation, RecommendationReason, User, WishlistEntry,
};
pub use wire::{ClientMessage, ServerMessage};
