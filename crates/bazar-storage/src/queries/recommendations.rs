// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted recommendation rows.
//!
//! The (user_id, item_id) pair is unique. Re-scoring an existing pair
//! replaces score and reason only; the `viewed` flag and `created_at`
//! stamp survive so a user's read state is never reset by a batch run.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database, OptionalExt};
use crate::models::{Recommendation, RecommendationReason};

const RECOMMENDATION_COLUMNS: &str =
    "id, user_id, item_id, score, reason, viewed, created_at";

fn row_to_recommendation(row: &rusqlite::Row) -> Result<Recommendation, rusqlite::Error> {
    let reason: String = row.get(4)?;
    let reason = reason.parse::<RecommendationReason>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Recommendation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_id: row.get(2)?,
        score: row.get(3)?,
        reason,
        viewed: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a recommendation, or refresh score and reason if the
/// (user, item) pair already exists.
pub async fn upsert(
    db: &Database,
    user_id: &str,
    item_id: &str,
    score: f64,
    reason: RecommendationReason,
    created_at: &str,
) -> Result<(), BazarError> {
    let user_id = user_id.to_string();
    let item_id = item_id.to_string();
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO recommendations (user_id, item_id, score, reason, viewed, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)
                 ON CONFLICT(user_id, item_id)
                 DO UPDATE SET score = excluded.score, reason = excluded.reason",
                params![user_id, item_id, score, reason.to_string(), created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up the recommendation for one (user, item) pair.
pub async fn get(
    db: &Database,
    user_id: &str,
    item_id: &str,
) -> Result<Option<Recommendation>, BazarError> {
    let user_id = user_id.to_string();
    let item_id = item_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations
                 WHERE user_id = ?1 AND item_id = ?2"
            ))?;
            let rec = stmt
                .query_row(params![user_id, item_id], row_to_recommendation)
                .optional()?;
            Ok(rec)
        })
        .await
        .map_err(map_tr_err)
}

/// A user's recommendations, highest score first.
pub async fn for_user(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<Recommendation>, BazarError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations
                 WHERE user_id = ?1 ORDER BY score DESC LIMIT {limit}"
            ))?;
            let recs = stmt
                .query_map(params![user_id], row_to_recommendation)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(recs)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a recommendation as viewed. Returns false if the row does not exist.
pub async fn mark_viewed(db: &Database, id: i64) -> Result<bool, BazarError> {
    db.connection()
        .call(move |conn| {
            let changed =
                conn.execute("UPDATE recommendations SET viewed = 1 WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
