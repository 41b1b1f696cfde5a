//! Database row models and their conversion to domain types.

use bridge_core::{
    validate_phone_number, Group, MemberRef, Membership, Message, Provenance, Role,
    SmsParticipant, User,
};
use sqlx::FromRow;

use crate::error::{DatabaseError, Result};

/// A row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self> {
        let phone = row
            .phone
            .as_deref()
            .map(validate_phone_number)
            .transpose()
            .map_err(|e| DatabaseError::corrupt("User", e))?;

        Ok(User {
            id: row.id.into(),
            email: row.email,
            display_name: row.display_name,
            phone,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row of the `sms_participants` table.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub id: String,
    pub phone: String,
    pub display_name: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ParticipantRow> for SmsParticipant {
    type Error = DatabaseError;

    fn try_from(row: ParticipantRow) -> Result<Self> {
        let phone =
            validate_phone_number(&row.phone).map_err(|e| DatabaseError::corrupt("SmsParticipant", e))?;

        Ok(SmsParticipant {
            id: row.id.into(),
            phone,
            display_name: row.display_name,
            created_by: row.created_by.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row of the `groups` table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupRow {
    pub id: String,
    pub name: String,
    pub routing_number: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<GroupRow> for Group {
    type Error = DatabaseError;

    fn try_from(row: GroupRow) -> Result<Self> {
        let routing_number =
            validate_phone_number(&row.routing_number).map_err(|e| DatabaseError::corrupt("Group", e))?;

        Ok(Group {
            id: row.id.into(),
            name: row.name,
            routing_number,
            created_by: row.created_by.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row of the `memberships` table.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    pub id: String,
    pub group_id: String,
    pub user_id: Option<String>,
    pub participant_id: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DatabaseError;

    fn try_from(row: MembershipRow) -> Result<Self> {
        let member = MemberRef::from_columns(row.user_id, row.participant_id)
            .map_err(|e| DatabaseError::corrupt("Membership", e))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| DatabaseError::corrupt("Membership", e))?;

        Ok(Membership {
            id: row.id.into(),
            group_id: row.group_id.into(),
            member,
            role,
            created_at: row.created_at,
        })
    }
}

/// A row of the `messages` table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: String,
    pub group_id: String,
    pub content: String,
    pub origin: String,
    pub sender_user_id: Option<String>,
    pub sender_participant_id: Option<String>,
    pub delivery_status: Option<String>,
    pub external_message_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = DatabaseError;

    fn try_from(row: MessageRow) -> Result<Self> {
        let provenance = Provenance::from_columns(
            &row.origin,
            row.sender_user_id,
            row.sender_participant_id,
            row.delivery_status.as_deref(),
            row.external_message_id,
        )
        .map_err(|e| DatabaseError::corrupt("Message", e))?;

        Ok(Message {
            id: row.id.into(),
            group_id: row.group_id.into(),
            content: row.content,
            provenance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first invalid one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}
