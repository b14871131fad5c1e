// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery CRUD operations.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database, OptionalExt};
use crate::models::{Delivery, GeoPoint};

const DELIVERY_COLUMNS: &str =
    "id, order_id, rider_id, status, current_lat, current_lng, location_updated_at, created_at";

fn row_to_delivery(row: &rusqlite::Row) -> Result<Delivery, rusqlite::Error> {
    let lat: Option<f64> = row.get(4)?;
    let lng: Option<f64> = row.get(5)?;
    let current_location = match (lat, lng) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };
    Ok(Delivery {
        id: row.get(0)?,
        order_id: row.get(1)?,
        rider_id: row.get(2)?,
        status: row.get(3)?,
        current_location,
        location_updated_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Create a new delivery.
pub async fn create_delivery(db: &Database, delivery: &Delivery) -> Result<(), BazarError> {
    let delivery = delivery.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO deliveries (id, order_id, rider_id, status, current_lat, current_lng, location_updated_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    delivery.id,
                    delivery.order_id,
                    delivery.rider_id,
                    delivery.status,
                    delivery.current_location.map(|p| p.latitude),
                    delivery.current_location.map(|p| p.longitude),
                    delivery.location_updated_at,
                    delivery.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a delivery by ID.
pub async fn get_delivery(db: &Database, id: &str) -> Result<Option<Delivery>, BazarError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ?1"
            ))?;
            let delivery = stmt.query_row(params![id], row_to_delivery).optional()?;
            Ok(delivery)
        })
        .await
        .map_err(map_tr_err)
}

/// Update a delivery's current location and return the updated record.
///
/// `stamped_at` is the server-side timestamp of the update. Returns `None`
/// when no delivery with that id exists.
pub async fn set_location(
    db: &Database,
    id: &str,
    location: GeoPoint,
    stamped_at: &str,
) -> Result<Option<Delivery>, BazarError> {
    let id = id.to_string();
    let stamped_at = stamped_at.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE deliveries SET current_lat = ?1, current_lng = ?2, location_updated_at = ?3
                 WHERE id = ?4",
                params![location.latitude, location.longitude, stamped_at, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let mut stmt = conn.prepare(&format!(
                "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ?1"
            ))?;
            let delivery = stmt.query_row(params![id], row_to_delivery).optional()?;
            Ok(delivery)
        })
        .await
        .map_err(map_tr_err)
}
