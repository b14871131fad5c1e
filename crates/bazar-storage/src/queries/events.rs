// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only domain event log.
//!
//! Events are never mutated after append except the `processed` flag, which
//! a downstream audit/replay consumer flips.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database, OptionalExt};
use crate::models::{DomainEvent, EntityKind};

const EVENT_COLUMNS: &str =
    "id, event_type, entity_id, entity_kind, user_id, data, processed, created_at";

fn row_to_event(row: &rusqlite::Row) -> Result<DomainEvent, rusqlite::Error> {
    let kind: String = row.get(3)?;
    let entity_kind = kind.parse::<EntityKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(DomainEvent {
        id: row.get(0)?,
        event_type: row.get(1)?,
        entity_id: row.get(2)?,
        entity_kind,
        user_id: row.get(4)?,
        data: row.get(5)?,
        processed: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Append an event to the log.
pub async fn append_event(db: &Database, event: &DomainEvent) -> Result<(), BazarError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO events (id, event_type, entity_id, entity_kind, user_id, data, processed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    event.id,
                    event.event_type,
                    event.entity_id,
                    event.entity_kind.to_string(),
                    event.user_id,
                    event.data,
                    event.processed,
                    event.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get an event by ID.
pub async fn get_event(db: &Database, id: &str) -> Result<Option<DomainEvent>, BazarError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"))?;
            let event = stmt.query_row(params![id], row_to_event).optional()?;
            Ok(event)
        })
        .await
        .map_err(map_tr_err)
}

/// All events about one entity, oldest first.
pub async fn events_for_entity(
    db: &Database,
    entity_kind: EntityKind,
    entity_id: &str,
) -> Result<Vec<DomainEvent>, BazarError> {
    let kind = entity_kind.to_string();
    let entity_id = entity_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE entity_kind = ?1 AND entity_id = ?2 ORDER BY created_at"
            ))?;
            let events = stmt
                .query_map(params![kind, entity_id], row_to_event)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(events)
        })
        .await
        .map_err(map_tr_err)
}

/// Flip an event's `processed` flag. The only permitted mutation.
pub async fn mark_processed(db: &Database, id: &str) -> Result<(), BazarError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("UPDATE events SET processed = 1 WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
