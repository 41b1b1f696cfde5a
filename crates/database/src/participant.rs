//! SMS participant operations.

use bridge_core::{ParticipantId, SmsParticipant, UserId, E164};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DatabaseError, Result};
use crate::models::ParticipantRow;

/// Look up a participant by exact phone number.
pub async fn find_by_phone(pool: &SqlitePool, phone: &E164) -> Result<Option<SmsParticipant>> {
    sqlx::query_as::<_, ParticipantRow>(
        r#"
        SELECT id, phone, display_name, created_by, created_at, updated_at
        FROM sms_participants
        WHERE phone = ?
        "#,
    )
    .bind(phone.as_str())
    .fetch_optional(pool)
    .await?
    .map(SmsParticipant::try_from)
    .transpose()
}

/// Get a participant by ID.
pub async fn get_participant(pool: &SqlitePool, id: &ParticipantId) -> Result<SmsParticipant> {
    sqlx::query_as::<_, ParticipantRow>(
        r#"
        SELECT id, phone, display_name, created_by, created_at, updated_at
        FROM sms_participants
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "SmsParticipant",
        id: id.to_string(),
    })?
    .try_into()
}

/// Find a participant by phone number, creating it if absent.
///
/// Returns the participant and whether it was created by this call. An
/// existing participant gets its display name replaced when a different
/// non-empty one is supplied.
pub async fn find_or_create(
    pool: &SqlitePool,
    phone: &E164,
    display_name: &str,
    created_by: &UserId,
) -> Result<(SmsParticipant, bool)> {
    if let Some(existing) = find_by_phone(pool, phone).await? {
        let existing = refresh_display_name(pool, existing, display_name).await?;
        return Ok((existing, false));
    }

    let id = ParticipantId::new();
    let inserted = sqlx::query(
        r#"
        INSERT INTO sms_participants (id, phone, display_name, created_by)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(phone.as_str())
    .bind(display_name)
    .bind(created_by.as_str())
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_write(e, "SmsParticipant", phone.as_str()));

    match inserted {
        Ok(_) => {
            debug!(phone = %phone, participant_id = %id, "Created SMS participant");
            Ok((get_participant(pool, &id).await?, true))
        }
        // Lost a race with a concurrent insert of the same number.
        Err(DatabaseError::AlreadyExists { .. }) => {
            let existing = find_by_phone(pool, phone).await?.ok_or_else(|| DatabaseError::NotFound {
                entity: "SmsParticipant",
                id: phone.to_string(),
            })?;
            let existing = refresh_display_name(pool, existing, display_name).await?;
            Ok((existing, false))
        }
        Err(e) => Err(e),
    }
}

async fn refresh_display_name(
    pool: &SqlitePool,
    participant: SmsParticipant,
    display_name: &str,
) -> Result<SmsParticipant> {
    if display_name.is_empty() || participant.display_name == display_name {
        return Ok(participant);
    }

    sqlx::query(
        r#"
        UPDATE sms_participants
        SET display_name = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(display_name)
    .bind(participant.id.as_str())
    .execute(pool)
    .await?;

    get_participant(pool, &participant.id).await
}
