// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation generation.
//!
//! Four weighted candidate sources run in a fixed order and are
//! concatenated, then deduplicated keeping the FIRST occurrence per item.
//! The source order is therefore part of the contract: a category match
//! beats a rating hit for the same item even when the rating score would
//! be higher. Survivors are sorted by score, capped, and upserted.

use std::collections::HashMap;

use bazar_core::{BazarError, Recommendation, RecommendationReason};
use bazar_storage::{
    queries::{items, recommendations, users, wishlists},
    Database,
};

const CATEGORY_SOURCE_LIMIT: usize = 5;
const RATING_SOURCE_LIMIT: usize = 3;
const PRICE_SOURCE_LIMIT: usize = 3;
const TRENDING_SOURCE_LIMIT: usize = 2;
const TOP_CATEGORIES: usize = 3;
const RATING_THRESHOLD: f64 = 4.0;
const TRENDING_WINDOW_DAYS: i64 = 30;
const TRENDING_SCORE: f64 = 65.0;
const PRICE_BAND_LOW: f64 = 0.6;
const PRICE_BAND_HIGH: f64 = 1.4;

struct Candidate {
    item_id: String,
    score: f64,
    reason: RecommendationReason,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    db: Database,
}

impl RecommendationEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Generate and persist up to `limit` recommendations for a user.
    ///
    /// Any failure is logged and yields an empty list; upserts that
    /// completed before the failure are not rolled back.
    pub async fn generate(&self, user_id: &str, limit: usize, exclude: &[String]) -> Vec<Recommendation> {
        match self.generate_inner(user_id, limit, exclude).await {
            Ok(recs) => recs,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "recommendation generation failed");
                vec![]
            }
        }
    }

    async fn generate_inner(
        &self,
        user_id: &str,
        limit: usize,
        exclude: &[String],
    ) -> Result<Vec<Recommendation>, BazarError> {
        let wishlist = wishlists::items_for_user(&self.db, user_id).await?;

        // Category frequency in first-seen order, so ties stay stable.
        let mut category_order: Vec<String> = Vec::new();
        let mut category_counts: HashMap<String, usize> = HashMap::new();
        let mut prices: Vec<f64> = Vec::new();
        for item in &wishlist {
            if !category_counts.contains_key(&item.category) {
                category_order.push(item.category.clone());
            }
            *category_counts.entry(item.category.clone()).or_insert(0) += 1;
            prices.push(item.price);
        }
        let avg_price = if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };

        let mut top_categories = category_order;
        top_categories.sort_by_key(|c| std::cmp::Reverse(category_counts[c]));
        top_categories.truncate(TOP_CATEGORIES);

        let mut candidates: Vec<Candidate> = Vec::new();

        for item in
            items::by_categories(&self.db, &top_categories, exclude, CATEGORY_SOURCE_LIMIT).await?
        {
            candidates.push(Candidate {
                item_id: item.id,
                score: 70.0 + item.rating * 5.0,
                reason: RecommendationReason::CategoryMatch,
            });
        }

        for item in
            items::top_rated(&self.db, RATING_THRESHOLD, exclude, RATING_SOURCE_LIMIT).await?
        {
            candidates.push(Candidate {
                item_id: item.id,
                score: 60.0 + item.rating * 8.0,
                reason: RecommendationReason::Rating,
            });
        }

        if avg_price > 0.0 {
            let low = avg_price * PRICE_BAND_LOW;
            let high = avg_price * PRICE_BAND_HIGH;
            for item in
                items::in_price_band(&self.db, low, high, exclude, PRICE_SOURCE_LIMIT).await?
            {
                candidates.push(Candidate {
                    item_id: item.id,
                    score: 50.0 + item.rating * 4.0,
                    reason: RecommendationReason::PriceRange,
                });
            }
        }

        let since = (chrono::Utc::now() - chrono::Duration::days(TRENDING_WINDOW_DAYS)).to_rfc3339();
        for item in items::created_since(&self.db, &since, exclude, TRENDING_SOURCE_LIMIT).await? {
            candidates.push(Candidate {
                item_id: item.id,
                score: TRENDING_SCORE,
                reason: RecommendationReason::Trending,
            });
        }

        // First occurrence wins, NOT the highest score.
        let mut seen = std::collections::HashSet::new();
        candidates.retain(|c| seen.insert(c.item_id.clone()));

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(limit);

        let now = chrono::Utc::now().to_rfc3339();
        let mut persisted = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            recommendations::upsert(
                &self.db,
                user_id,
                &candidate.item_id,
                candidate.score,
                candidate.reason,
                &now,
            )
            .await?;
            if let Some(rec) =
                recommendations::get(&self.db, user_id, &candidate.item_id).await?
            {
                persisted.push(rec);
            }
        }
        Ok(persisted)
    }

    /// Persisted recommendations for a user, highest score first.
    pub async fn recommendations_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Recommendation>, BazarError> {
        recommendations::for_user(&self.db, user_id, limit).await
    }

    /// Mark a recommendation as viewed. Returns false if no such row.
    pub async fn mark_viewed(&self, id: i64) -> Result<bool, BazarError> {
        recommendations::mark_viewed(&self.db, id).await
    }

    /// Regenerate recommendations for every active user, sequentially.
    /// Per-user failures are absorbed inside `generate`; returns the
    /// number of users processed.
    pub async fn generate_for_all_users(&self, limit: usize) -> Result<usize, BazarError> {
        let user_ids = users::active_user_ids(&self.db).await?;
        let count = user_ids.len();
        for user_id in user_ids {
            let recs = self.generate(&user_id, limit, &[]).await;
            tracing::debug!(%user_id, generated = recs.len(), "scheduled recommendation run");
        }
        Ok(count)
    }
}
