// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Bazar marketplace core.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed CRUD operations for
//! orders, deliveries, items, wishlists, users, domain events, notifications,
//! and recommendations.

pub mod database;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
