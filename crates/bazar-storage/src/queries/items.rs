// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog item queries feeding the recommendation candidate sources.
//!
//! Every query takes an `exclude` list (items the caller already owns or has
//! already been recommended) rendered as a dynamic NOT IN clause.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::Item;

const ITEM_COLUMNS: &str = "id, name, category, price, rating, review_count, created_at";

fn row_to_item(row: &rusqlite::Row) -> Result<Item, rusqlite::Error> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        rating: row.get(4)?,
        review_count: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Render `?N` placeholders for `count` parameters starting at `start`.
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create a new catalog item.
pub async fn create_item(db: &Database, item: &Item) -> Result<(), BazarError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO items (id, name, category, price, rating, review_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item.id,
                    item.name,
                    item.category,
                    item.price,
                    item.rating,
                    item.review_count,
                    item.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Items in any of the given categories, best-rated and newest first.
pub async fn by_categories(
    db: &Database,
    categories: &[String],
    exclude: &[String],
    limit: usize,
) -> Result<Vec<Item>, BazarError> {
    if categories.is_empty() {
        return Ok(vec![]);
    }
    let categories = categories.to_vec();
    let exclude = exclude.to_vec();
    db.connection()
        .call(move |conn| {
            let cat_ph = placeholders(1, categories.len());
            let excl_clause = if exclude.is_empty() {
                String::new()
            } else {
                format!(
                    " AND id NOT IN ({})",
                    placeholders(categories.len() + 1, exclude.len())
                )
            };
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE category IN ({cat_ph}){excl_clause}
                 ORDER BY rating DESC, created_at DESC LIMIT {limit}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let bound: Vec<&dyn rusqlite::types::ToSql> = categories
                .iter()
                .chain(exclude.iter())
                .map(|s| s as &dyn rusqlite::types::ToSql)
                .collect();
            let items = stmt
                .query_map(bound.as_slice(), row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Items rated at least `min_rating`, best-rated and most-reviewed first.
pub async fn top_rated(
    db: &Database,
    min_rating: f64,
    exclude: &[String],
    limit: usize,
) -> Result<Vec<Item>, BazarError> {
    let exclude = exclude.to_vec();
    db.connection()
        .call(move |conn| {
            let excl_clause = if exclude.is_empty() {
                String::new()
            } else {
                format!(" AND id NOT IN ({})", placeholders(2, exclude.len()))
            };
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE rating >= ?1{excl_clause}
                 ORDER BY rating DESC, review_count DESC LIMIT {limit}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut bound: Vec<&dyn rusqlite::types::ToSql> = vec![&min_rating];
            bound.extend(exclude.iter().map(|s| s as &dyn rusqlite::types::ToSql));
            let items = stmt
                .query_map(bound.as_slice(), row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Items priced within `[low, high]`, best-rated and newest first.
pub async fn in_price_band(
    db: &Database,
    low: f64,
    high: f64,
    exclude: &[String],
    limit: usize,
) -> Result<Vec<Item>, BazarError> {
    let exclude = exclude.to_vec();
    db.connection()
        .call(move |conn| {
            let excl_clause = if exclude.is_empty() {
                String::new()
            } else {
                format!(" AND id NOT IN ({})", placeholders(3, exclude.len()))
            };
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE price >= ?1 AND price <= ?2{excl_clause}
                 ORDER BY rating DESC, created_at DESC LIMIT {limit}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut bound: Vec<&dyn rusqlite::types::ToSql> = vec![&low, &high];
            bound.extend(exclude.iter().map(|s| s as &dyn rusqlite::types::ToSql));
            let items = stmt
                .query_map(bound.as_slice(), row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Items created at or after `since` (RFC 3339), best-rated and newest first.
pub async fn created_since(
    db: &Database,
    since: &str,
    exclude: &[String],
    limit: usize,
) -> Result<Vec<Item>, BazarError> {
    let since = since.to_string();
    let exclude = exclude.to_vec();
    db.connection()
        .call(move |conn| {
            let excl_clause = if exclude.is_empty() {
                String::new()
            } else {
                format!(" AND id NOT IN ({})", placeholders(2, exclude.len()))
            };
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE created_at >= ?1{excl_clause}
                 ORDER BY rating DESC, created_at DESC LIMIT {limit}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut bound: Vec<&dyn rusqlite::types::ToSql> = vec![&since];
            bound.extend(exclude.iter().map(|s| s as &dyn rusqlite::types::ToSql));
            let items = stmt
                .query_map(bound.as_slice(), row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}
