// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order CRUD operations.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database, OptionalExt};
use crate::models::Order;

fn row_to_order(row: &rusqlite::Row) -> Result<Order, rusqlite::Error> {
    Ok(Order {
        id: row.get(0)?,
        buyer_id: row.get(1)?,
        status: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Create a new order.
pub async fn create_order(db: &Database, order: &Order) -> Result<(), BazarError> {
    let order = order.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO orders (id, buyer_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    order.id,
                    order.buyer_id,
                    order.status,
                    order.created_at,
                    order.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get an order by ID.
pub async fn get_order(db: &Database, id: &str) -> Result<Option<Order>, BazarError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, buyer_id, status, created_at, updated_at FROM orders WHERE id = ?1",
            )?;
            let order = stmt.query_row(params![id], row_to_order).optional()?;
            Ok(order)
        })
        .await
        .map_err(map_tr_err)
}

/// Update an order's status and return the updated record.
///
/// Returns `None` when no order with that id exists (nothing was updated),
/// mirroring a find-and-update that yields the post-update document or null.
pub async fn set_status(
    db: &Database,
    id: &str,
    status: &str,
    updated_at: &str,
) -> Result<Option<Order>, BazarError> {
    let id = id.to_string();
    let status = status.to_string();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status, updated_at, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let mut stmt = conn.prepare(
                "SELECT id, buyer_id, status, created_at, updated_at FROM orders WHERE id = ?1",
            )?;
            let order = stmt.query_row(params![id], row_to_order).optional()?;
            Ok(order)
        })
        .await
        .map_err(map_tr_err)
}
