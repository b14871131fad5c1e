// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account queries.

use bazar_core::BazarError;
use rusqlite::params;

use crate::database::{map_tr_err, Database, OptionalExt};
use crate::models::User;

/// Create a new user.
pub async fn create_user(db: &Database, user: &User) -> Result<(), BazarError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, name, active, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.name, user.active, user.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user by ID.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, BazarError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, active, created_at FROM users WHERE id = ?1")?;
            let user = stmt
                .query_row(params![id], |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        active: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })
                .optional()?;
            Ok(user)
        })
        .await
        .map_err(map_tr_err)
}

/// Ids of all active users, in creation order. Drives the scheduled
/// recommendation batch.
pub async fn active_user_ids(db: &Database) -> Result<Vec<String>, BazarError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT id FROM users WHERE active = 1 ORDER BY created_at")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(id: &str, active: bool) -> User {
        User {
            id: id.to_string(),
            name: format!("User {id}"),
            active,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_get_user_roundtrips() {
        let db = Database::open_in_memory().await.unwrap();
        create_user(&db, &make_user("u-1", true)).await.unwrap();

        let user = get_user(&db, "u-1").await.unwrap().unwrap();
        assert_eq!(user.id, "u-1");
        assert!(user.active);
    }

    #[tokio::test]
    async fn active_user_ids_skips_inactive() {
        let db = Database::open_in_memory().await.unwrap();
        create_user(&db, &make_user("u-active", true)).await.unwrap();
        create_user(&db, &make_user("u-gone", false)).await.unwrap();

        let ids = active_user_ids(&db).await.unwrap();
        assert_eq!(ids, vec!["u-active".to_string()]);
    }
}
