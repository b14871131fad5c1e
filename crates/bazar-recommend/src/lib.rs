// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation engine for the Bazar marketplace.
//!
//! Scores candidate items from a user's wishlist signals (categories,
//! price band, ratings, recency) and persists ranked, deduplicated
//! recommendations. Runs on demand or as a scheduled batch.

pub mod engine;

pub use engine::RecommendationEngine;
