//! Message operations.

use bridge_core::{
    Capability, DeliveryStatus, GroupId, MemberRef, Message, MessageId, NewMessage, Permission,
    Provenance,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DatabaseError, Result};
use crate::membership;
use crate::models::{convert_all, MessageRow};

const SELECT_COLUMNS: &str = r#"
    SELECT id, group_id, content, origin, sender_user_id, sender_participant_id,
           delivery_status, external_message_id, created_at, updated_at
    FROM messages
"#;

/// Insert a message into a group's timeline.
///
/// An end user may only insert app-origin messages authored by themself
/// into a group they belong to. The service capability admits any valid
/// message, including SMS-origin ones.
pub async fn insert_message(pool: &SqlitePool, capability: &Capability, new: &NewMessage) -> Result<Message> {
    if let Capability::EndUser(actor) = capability {
        match &new.provenance {
            Provenance::App { sender, .. } if sender == actor => {}
            _ => {
                return Err(DatabaseError::Forbidden(format!(
                    "{actor} may only post app messages as themself"
                )))
            }
        }
        let role = membership::role_of(pool, &new.group_id, &MemberRef::User(actor.clone())).await?;
        if !Permission::SendMessage.allowed_for(role) {
            return Err(DatabaseError::Forbidden(format!(
                "{actor} is not a member of group {}",
                new.group_id
            )));
        }
    }

    let id = MessageId::new();
    let sender = new.provenance.sender();
    let (sender_user_id, sender_participant_id) = sender.columns();

    sqlx::query(
        r#"
        INSERT INTO messages (id, group_id, content, origin, sender_user_id,
                              sender_participant_id, delivery_status, external_message_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(new.group_id.as_str())
    .bind(&new.content)
    .bind(new.provenance.origin().as_str())
    .bind(sender_user_id)
    .bind(sender_participant_id)
    .bind(new.provenance.status().map(|s| s.as_str()))
    .bind(new.provenance.external_id())
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_write(e, "Message", id.as_str()))?;

    debug!(message_id = %id, group_id = %new.group_id, origin = %new.provenance.origin().as_str(), "Inserted message");
    get_message(pool, &id).await
}

/// Get a message by ID.
pub async fn get_message(pool: &SqlitePool, id: &MessageId) -> Result<Message> {
    sqlx::query_as::<_, MessageRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Message",
            id: id.to_string(),
        })?
        .try_into()
}

/// Find a message by carrier message identifier.
///
/// Identifiers are assumed unique per lookup; if several rows share one,
/// the earliest is returned.
pub async fn find_by_external_id(pool: &SqlitePool, external_id: &str) -> Result<Option<Message>> {
    sqlx::query_as::<_, MessageRow>(&format!(
        "{SELECT_COLUMNS} WHERE external_message_id = ? ORDER BY created_at, rowid LIMIT 1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?
    .map(Message::try_from)
    .transpose()
}

/// Record the outcome of a dispatch on an app-origin message.
///
/// `external_id` is kept when `None` is passed. Service capability only.
pub async fn record_delivery(
    pool: &SqlitePool,
    capability: &Capability,
    id: &MessageId,
    external_id: Option<&str>,
    status: DeliveryStatus,
) -> Result<()> {
    if !capability.is_service() {
        return Err(DatabaseError::Forbidden(
            "delivery state is written by the service only".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE messages
        SET delivery_status = ?,
            external_message_id = COALESCE(?, external_message_id),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND origin = 'app'
        "#,
    )
    .bind(status.as_str())
    .bind(external_id)
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Message",
            id: id.to_string(),
        });
    }

    info!(message_id = %id, status = %status.as_str(), "Recorded delivery");
    Ok(())
}

/// Overwrite the delivery status of an app-origin message.
pub async fn set_delivery_status(
    pool: &SqlitePool,
    capability: &Capability,
    id: &MessageId,
    status: DeliveryStatus,
) -> Result<()> {
    record_delivery(pool, capability, id, None, status).await
}

/// The most recent `limit` messages of a group, oldest first.
pub async fn list_recent(pool: &SqlitePool, group_id: &GroupId, limit: u32) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, group_id, content, origin, sender_user_id, sender_participant_id,
               delivery_status, external_message_id, created_at, updated_at
        FROM (
            SELECT rowid AS seq, *
            FROM messages
            WHERE group_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
        )
        ORDER BY created_at, seq
        "#,
    )
    .bind(group_id.as_str())
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::Role;

    use crate::test_support::{seed_group, seed_participant, seed_user, test_db};

    #[tokio::test]
    async fn test_member_inserts_app_message() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let group = seed_group(&db, &owner, "+15550000001").await;

        let new = NewMessage::app(group.id.clone(), owner.id.clone(), "hello");
        let msg = insert_message(db.pool(), &Capability::EndUser(owner.id.clone()), &new)
            .await
            .unwrap();

        assert!(msg.is_app_origin());
        assert_eq!(msg.content, "hello");
        assert_eq!(msg.provenance.status(), Some(DeliveryStatus::Pending));
        assert_eq!(msg.provenance.external_id(), None);
    }

    #[tokio::test]
    async fn test_non_member_insert_forbidden() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let outsider = seed_user(&db, "ben").await;
        let group = seed_group(&db, &owner, "+15550000001").await;

        let new = NewMessage::app(group.id.clone(), outsider.id.clone(), "let me in");
        let result = insert_message(db.pool(), &Capability::EndUser(outsider.id.clone()), &new).await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_end_user_cannot_impersonate() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let group = seed_group(&db, &owner, "+15550000001").await;
        let texter = seed_participant(&db, &owner, "+15551234567").await;

        let as_owner = Capability::EndUser(owner.id.clone());
        let spoofed_sms = NewMessage::sms(group.id.clone(), texter.id.clone(), "hi", "SM1").unwrap();
        let result = insert_message(db.pool(), &as_owner, &spoofed_sms).await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));

        let other = seed_user(&db, "ben").await;
        let spoofed_app = NewMessage::app(group.id.clone(), other.id.clone(), "hi");
        let result = insert_message(db.pool(), &as_owner, &spoofed_app).await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_service_inserts_sms_message_and_finds_by_external_id() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let group = seed_group(&db, &owner, "+15550000001").await;
        let texter = seed_participant(&db, &owner, "+15551234567").await;

        let new = NewMessage::sms(group.id.clone(), texter.id.clone(), "Hello", "SM123").unwrap();
        let msg = insert_message(db.pool(), &Capability::Service, &new).await.unwrap();

        assert_eq!(msg.provenance.sender(), MemberRef::Participant(texter.id.clone()));
        assert_eq!(msg.provenance.status(), None);

        let found = find_by_external_id(db.pool(), "SM123").await.unwrap().unwrap();
        assert_eq!(found.id, msg.id);
        assert!(find_by_external_id(db.pool(), "SM999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_inbound_external_ids_are_both_stored() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let group = seed_group(&db, &owner, "+15550000001").await;
        let texter = seed_participant(&db, &owner, "+15551234567").await;

        let new = NewMessage::sms(group.id.clone(), texter.id.clone(), "again", "SMdup").unwrap();
        let first = insert_message(db.pool(), &Capability::Service, &new).await.unwrap();
        insert_message(db.pool(), &Capability::Service, &new).await.unwrap();

        assert_eq!(list_recent(db.pool(), &group.id, 10).await.unwrap().len(), 2);
        let found = find_by_external_id(db.pool(), "SMdup").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_record_delivery_keeps_external_id() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let group = seed_group(&db, &owner, "+15550000001").await;
        let new = NewMessage::app(group.id.clone(), owner.id.clone(), "out");
        let msg = insert_message(db.pool(), &Capability::Service, &new).await.unwrap();

        record_delivery(db.pool(), &Capability::Service, &msg.id, Some("SMout"), DeliveryStatus::Sent)
            .await
            .unwrap();
        set_delivery_status(db.pool(), &Capability::Service, &msg.id, DeliveryStatus::Failed)
            .await
            .unwrap();

        let stored = get_message(db.pool(), &msg.id).await.unwrap();
        assert_eq!(stored.provenance.status(), Some(DeliveryStatus::Failed));
        assert_eq!(stored.provenance.external_id(), Some("SMout"));
    }

    #[tokio::test]
    async fn test_record_delivery_rejects_end_user_and_sms_rows() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let group = seed_group(&db, &owner, "+15550000001").await;
        let texter = seed_participant(&db, &owner, "+15551234567").await;

        let app = insert_message(
            db.pool(),
            &Capability::Service,
            &NewMessage::app(group.id.clone(), owner.id.clone(), "out"),
        )
        .await
        .unwrap();
        let result = set_delivery_status(
            db.pool(),
            &Capability::EndUser(owner.id.clone()),
            &app.id,
            DeliveryStatus::Delivered,
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));

        let sms = insert_message(
            db.pool(),
            &Capability::Service,
            &NewMessage::sms(group.id.clone(), texter.id.clone(), "in", "SMin").unwrap(),
        )
        .await
        .unwrap();
        let result = set_delivery_status(db.pool(), &Capability::Service, &sms.id, DeliveryStatus::Delivered).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_recent_returns_latest_oldest_first() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let group = seed_group(&db, &owner, "+15550000001").await;

        for text in ["one", "two", "three", "four"] {
            let new = NewMessage::app(group.id.clone(), owner.id.clone(), text);
            insert_message(db.pool(), &Capability::Service, &new).await.unwrap();
        }

        let recent = list_recent(db.pool(), &group.id, 3).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "three", "four"]);
    }

    #[tokio::test]
    async fn test_removed_member_can_no_longer_send() {
        let db = test_db().await;
        let owner = seed_user(&db, "ana").await;
        let friend = seed_user(&db, "ben").await;
        let group = seed_group(&db, &owner, "+15550000001").await;
        let friend_ref = MemberRef::User(friend.id.clone());

        membership::add_member(db.pool(), &Capability::Service, &group.id, &friend_ref, Role::Member)
            .await
            .unwrap();
        let as_friend = Capability::EndUser(friend.id.clone());
        let new = NewMessage::app(group.id.clone(), friend.id.clone(), "hi");
        insert_message(db.pool(), &as_friend, &new).await.unwrap();

        membership::remove_member(db.pool(), &as_friend, &group.id, &friend_ref)
            .await
            .unwrap();
        let result = insert_message(db.pool(), &as_friend, &new).await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }
}
