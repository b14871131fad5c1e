// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable per-user notification records.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{Notification, NotificationKind};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, message, order_id, delivery_id, created_at";

fn row_to_notification(row: &rusqlite::Row) -> Result<Notification, rusqlite::Error> {
    let kind: String = row.get(2)?;
    let kind = kind.parse::<NotificationKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        title: row.get(3)?,
        message: row.get(4)?,
        order_id: row.get(5)?,
        delivery_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Persist a notification.
pub async fn create_notification(
    db: &Database,
    notification: &Notification,
) -> Result<(), BazarError> {
    let n = notification.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notifications (id, user_id, kind, title, message, order_id, delivery_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    n.id,
                    n.user_id,
                    n.kind.to_string(),
                    n.title,
                    n.message,
                    n.order_id,
                    n.delivery_id,
                    n.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// A user's notifications, newest first.
pub async fn for_user(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<Notification>, BazarError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE user_id = ?1 ORDER BY created_at DESC LIMIT {limit}"
            ))?;
            let notifications = stmt
                .query_map(params![user_id], row_to_notification)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(notifications)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_notification(id: &str, user_id: &str, created_at: &str) -> Notification {
        Notification {
            id: id.to_string(),
            user_id: user_id.to_string(),
            kind: NotificationKind::Order,
            title: "Order Update".to_string(),
            message: "Your order status is now shipped".to_string(),
            order_id: Some("o-1".to_string()),
            delivery_id: None,
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_list_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        create_notification(&db, &make_notification("n-1", "u-1", "2026-01-01T00:00:00+00:00"))
            .await
            .unwrap();
        create_notification(&db, &make_notification("n-2", "u-1", "2026-01-02T00:00:00+00:00"))
            .await
            .unwrap();
        create_notification(&db, &make_notification("n-3", "u-2", "2026-01-03T00:00:00+00:00"))
            .await
            .unwrap();

        let list = for_user(&db, "u-1", 10).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "n-2");
        assert_eq!(list[1].id, "n-1");
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let db = Database::open_in_memory().await.unwrap();
        for i in 0..5 {
            create_notification(
                &db,
                &make_notification(
                    &format!("n-{i}"),
                    "u-1",
                    &format!("2026-01-0{}T00:00:00+00:00", i + 1),
                ),
            )
            .await
            .unwrap();
        }

        let list = for_user(&db, "u-1", 3).await.unwrap();
        assert_eq!(list.len(), 3);
    }
}
