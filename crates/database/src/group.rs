//! Group operations.

use bridge_core::{Group, GroupId, MembershipId, Role, UserId, E164};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DatabaseError, Result};
use crate::models::{convert_all, GroupRow};

/// Create a group and install its creator as owner, atomically.
///
/// Fails with `AlreadyExists` if another group already uses the routing number.
pub async fn create_group(
    pool: &SqlitePool,
    name: &str,
    routing_number: &E164,
    creator: &UserId,
) -> Result<Group> {
    let id = GroupId::new();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO groups (id, name, routing_number, created_by)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(name)
    .bind(routing_number.as_str())
    .bind(creator.as_str())
    .execute(&mut *tx)
    .await
    .map_err(|e| DatabaseError::on_write(e, "Group", routing_number.as_str()))?;

    sqlx::query(
        r#"
        INSERT INTO memberships (id, group_id, user_id, role)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(MembershipId::new().as_str())
    .bind(id.as_str())
    .bind(creator.as_str())
    .bind(Role::Owner.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(group_id = %id, routing_number = %routing_number, "Created group");
    get_group(pool, &id).await
}

/// Get a group by ID.
pub async fn get_group(pool: &SqlitePool, id: &GroupId) -> Result<Group> {
    sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT id, name, routing_number, created_by, created_at, updated_at
        FROM groups
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Group",
        id: id.to_string(),
    })?
    .try_into()
}

/// Find the group bound to a routing number (exact match).
pub async fn find_by_routing_number(pool: &SqlitePool, number: &E164) -> Result<Option<Group>> {
    sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT id, name, routing_number, created_by, created_at, updated_at
        FROM groups
        WHERE routing_number = ?
        "#,
    )
    .bind(number.as_str())
    .fetch_optional(pool)
    .await?
    .map(Group::try_from)
    .transpose()
}

/// Rebind a group to a different routing number.
pub async fn update_routing_number(pool: &SqlitePool, id: &GroupId, number: &E164) -> Result<Group> {
    let result = sqlx::query(
        r#"
        UPDATE groups
        SET routing_number = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(number.as_str())
    .bind(id.as_str())
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_write(e, "Group", number.as_str()))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Group",
            id: id.to_string(),
        });
    }

    get_group(pool, id).await
}

/// Delete a group. Memberships and messages cascade.
pub async fn delete_group(pool: &SqlitePool, id: &GroupId) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM groups
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Group",
            id: id.to_string(),
        });
    }

    info!(group_id = %id, "Deleted group");
    Ok(())
}

/// List the groups a user belongs to.
pub async fn list_groups_for_user(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Group>> {
    let rows = sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT g.id, g.name, g.routing_number, g.created_by, g.created_at, g.updated_at
        FROM groups g
        INNER JOIN memberships m ON m.group_id = g.id
        WHERE m.user_id = ?
        ORDER BY g.name
        "#,
    )
    .bind(user_id.as_str())
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}
