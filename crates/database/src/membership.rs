//! Membership operations.

use bridge_core::{
    can_remove_member, Capability, GroupId, MemberRef, Membership, MembershipId, Permission, Role,
    SmsParticipant,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DatabaseError, Result};
use crate::models::{convert_all, MembershipRow, ParticipantRow};

/// Look up a member's role in a group. `None` means not a member.
pub async fn role_of(pool: &SqlitePool, group_id: &GroupId, member: &MemberRef) -> Result<Option<Role>> {
    Ok(get_membership(pool, group_id, member).await?.map(|m| m.role))
}

/// Get the membership row linking `member` to `group_id`, if any.
pub async fn get_membership(
    pool: &SqlitePool,
    group_id: &GroupId,
    member: &MemberRef,
) -> Result<Option<Membership>> {
    let (user_id, participant_id) = member.columns();

    sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT id, group_id, user_id, participant_id, role, created_at
        FROM memberships
        WHERE group_id = ? AND (user_id = ? OR participant_id = ?)
        "#,
    )
    .bind(group_id.as_str())
    .bind(user_id)
    .bind(participant_id)
    .fetch_optional(pool)
    .await?
    .map(Membership::try_from)
    .transpose()
}

/// Add a member to a group.
///
/// End-user writes require the actor to hold a role that may add members.
pub async fn add_member(
    pool: &SqlitePool,
    capability: &Capability,
    group_id: &GroupId,
    member: &MemberRef,
    role: Role,
) -> Result<Membership> {
    if let Capability::EndUser(actor) = capability {
        let actor_role = role_of(pool, group_id, &MemberRef::User(actor.clone())).await?;
        if !Permission::AddMember.allowed_for(actor_role) {
            return Err(DatabaseError::Forbidden(format!(
                "{actor} may not add members to group {group_id}"
            )));
        }
    }

    let id = MembershipId::new();
    let (user_id, participant_id) = member.columns();

    sqlx::query(
        r#"
        INSERT INTO memberships (id, group_id, user_id, participant_id, role)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(group_id.as_str())
    .bind(user_id)
    .bind(participant_id)
    .bind(role.as_str())
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_write(e, "Membership", format!("{group_id}/{member}")))?;

    info!(group_id = %group_id, member = %member, role = %role, "Added member");

    get_membership(pool, group_id, member)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Membership",
            id: id.to_string(),
        })
}

/// Remove a member from a group.
///
/// End-user writes follow the removal rule in [`can_remove_member`].
pub async fn remove_member(
    pool: &SqlitePool,
    capability: &Capability,
    group_id: &GroupId,
    member: &MemberRef,
) -> Result<()> {
    let target = get_membership(pool, group_id, member)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Membership",
            id: format!("{group_id}/{member}"),
        })?;

    if let Capability::EndUser(actor) = capability {
        let actor_ref = MemberRef::User(actor.clone());
        let actor_role = role_of(pool, group_id, &actor_ref).await?;
        if !can_remove_member(&actor_ref, actor_role, member, target.role) {
            return Err(DatabaseError::Forbidden(format!(
                "{actor} may not remove {member} from group {group_id}"
            )));
        }
    }

    sqlx::query(
        r#"
        DELETE FROM memberships
        WHERE id = ?
        "#,
    )
    .bind(target.id.as_str())
    .execute(pool)
    .await?;

    info!(group_id = %group_id, member = %member, "Removed member");
    Ok(())
}

/// List every membership of a group, oldest first.
pub async fn list_members(pool: &SqlitePool, group_id: &GroupId) -> Result<Vec<Membership>> {
    let rows = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT id, group_id, user_id, participant_id, role, created_at
        FROM memberships
        WHERE group_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(group_id.as_str())
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

/// The SMS participants of a group: the dispatcher's fan-out targets.
pub async fn list_sms_participants(pool: &SqlitePool, group_id: &GroupId) -> Result<Vec<SmsParticipant>> {
    let rows = sqlx::query_as::<_, ParticipantRow>(
        r#"
        SELECT p.id, p.phone, p.display_name, p.created_by, p.created_at, p.updated_at
        FROM sms_participants p
        INNER JOIN memberships m ON m.participant_id = p.id
        WHERE m.group_id = ?
        ORDER BY m.created_at, m.rowid
        "#,
    )
    .bind(group_id.as_str())
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

/// Count owners of a group.
pub async fn count_owners(pool: &SqlitePool, group_id: &GroupId) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM memberships
        WHERE group_id = ? AND role = 'owner'
        "#,
    )
    .bind(group_id.as_str())
    .fetch_one(pool)
    .await?;

    Ok(count)
}
