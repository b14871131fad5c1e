// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wishlist queries.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{Item, WishlistEntry};

/// Add an item to a user's wishlist. Re-adding the same pair is a no-op.
pub async fn add_entry(db: &Database, entry: &WishlistEntry) -> Result<(), BazarError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO wishlists (user_id, item_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![entry.user_id, entry.item_id, entry.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The full item records on a user's wishlist, newest entries first.
pub async fn items_for_user(db: &Database, user_id: &str) -> Result<Vec<Item>, BazarError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT i.id, i.name, i.category, i.price, i.rating, i.review_count, i.created_at
                 FROM wishlists w JOIN items i ON i.id = w.item_id
                 WHERE w.user_id = ?1 ORDER BY w.created_at DESC",
            )?;
            let items = stmt
                .query_map(params![user_id], |row| {
                    Ok(Item {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        category: row.get(2)?,
                        price: row.get(3)?,
                        rating: row.get(4)?,
                        review_count: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Item ids on a user's wishlist, for exclusion lists.
pub async fn item_ids_for_user(db: &Database, user_id: &str) -> Result<Vec<String>, BazarError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT item_id FROM wishlists WHERE user_id = ?1")?;
            let ids = stmt
                .query_map(params![user_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}
