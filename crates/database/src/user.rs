//! User operations.
//!
//! Users are created by the auth provider; this table mirrors them.

use bridge_core::{User, UserId, E164};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::UserRow;

/// Insert a user on first signup, or refresh email and display name.
pub async fn upsert_user(
    pool: &SqlitePool,
    id: &UserId,
    email: &str,
    display_name: &str,
) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, display_name)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            display_name = excluded.display_name,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(id.as_str())
    .bind(email)
    .bind(display_name)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_write(e, "User", email))?;

    get_user(pool, id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &UserId) -> Result<User> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, display_name, phone, avatar_url, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })?
    .try_into()
}

/// Get just the display name, if the user exists.
pub async fn get_display_name(pool: &SqlitePool, id: &UserId) -> Result<Option<String>> {
    let name = sqlx::query_scalar::<_, String>(
        r#"
        SELECT display_name
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(name)
}

/// Fields a profile update may change. `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate<'a> {
    pub display_name: Option<&'a str>,
    pub phone: Option<&'a E164>,
    pub avatar_url: Option<&'a str>,
}

/// Apply a profile update.
pub async fn update_profile(pool: &SqlitePool, id: &UserId, update: &ProfileUpdate<'_>) -> Result<User> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET display_name = COALESCE(?, display_name),
            phone = COALESCE(?, phone),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(update.display_name)
    .bind(update.phone.map(E164::as_str))
    .bind(update.avatar_url)
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    get_user(pool, id).await
}

/// Delete a user by ID (account deletion). Memberships cascade.
pub async fn delete_user(pool: &SqlitePool, id: &UserId) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}
