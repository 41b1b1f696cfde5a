//! Domain entities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::{GroupId, MembershipId, MessageId, ParticipantId, UserId};
use crate::phone::E164;
use crate::status::DeliveryStatus;

/// An authenticated app user, mirrored from the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub phone: Option<E164>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A phone-only identity. Unique by phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsParticipant {
    pub id: ParticipantId,
    pub phone: E164,
    pub display_name: String,
    pub created_by: UserId,
    pub created_at: String,
    pub updated_at: String,
}

/// A conversation bound to one dedicated routing number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub routing_number: E164,
    pub created_by: UserId,
    pub created_at: String,
    pub updated_at: String,
}

/// Role of a member inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(ModelError::UnknownValue {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// The one identity a membership (or an actor) refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MemberRef {
    User(UserId),
    Participant(ParticipantId),
}

impl MemberRef {
    /// Build from the two nullable foreign-key columns. Exactly one must be set.
    pub fn from_columns(
        user_id: Option<String>,
        participant_id: Option<String>,
    ) -> Result<Self, ModelError> {
        match (user_id, participant_id) {
            (Some(user), None) => Ok(MemberRef::User(user.into())),
            (None, Some(participant)) => Ok(MemberRef::Participant(participant.into())),
            _ => Err(ModelError::MemberMismatch),
        }
    }

    /// Split back into `(user_id, participant_id)` columns.
    pub fn columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            MemberRef::User(id) => (Some(id.as_str()), None),
            MemberRef::Participant(id) => (None, Some(id.as_str())),
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRef::User(id) => write!(f, "user:{id}"),
            MemberRef::Participant(id) => write!(f, "participant:{id}"),
        }
    }
}

/// Link between a group and one user or participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub group_id: GroupId,
    pub member: MemberRef,
    pub role: Role,
    pub created_at: String,
}

/// Origin discriminant of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    App,
    Sms,
}

impl MessageOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOrigin::App => "app",
            MessageOrigin::Sms => "sms",
        }
    }
}

impl FromStr for MessageOrigin {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(MessageOrigin::App),
            "sms" => Ok(MessageOrigin::Sms),
            other => Err(ModelError::UnknownOrigin(other.to_string())),
        }
    }
}

/// Who sent a message and what the origin implies about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum Provenance {
    /// Authored in the app. Status and carrier id appear once dispatched.
    App {
        sender: UserId,
        status: Option<DeliveryStatus>,
        external_id: Option<String>,
    },
    /// Received over SMS. Always carries the inbound carrier id.
    Sms {
        sender: ParticipantId,
        external_id: String,
    },
}

impl Provenance {
    /// Rebuild from flat storage columns, enforcing the origin invariants.
    pub fn from_columns(
        origin: &str,
        sender_user_id: Option<String>,
        sender_participant_id: Option<String>,
        delivery_status: Option<&str>,
        external_id: Option<String>,
    ) -> Result<Self, ModelError> {
        match origin.parse::<MessageOrigin>()? {
            MessageOrigin::App => {
                let (Some(sender), None) = (sender_user_id, sender_participant_id) else {
                    return Err(ModelError::SenderMismatch { origin: "app" });
                };
                let status = delivery_status
                    .map(str::parse::<DeliveryStatus>)
                    .transpose()?;
                Ok(Provenance::App {
                    sender: sender.into(),
                    status,
                    external_id,
                })
            }
            MessageOrigin::Sms => {
                let (None, Some(sender)) = (sender_user_id, sender_participant_id) else {
                    return Err(ModelError::SenderMismatch { origin: "sms" });
                };
                if delivery_status.is_some() {
                    return Err(ModelError::UnexpectedStatus);
                }
                match external_id {
                    Some(external_id) if !external_id.is_empty() => Ok(Provenance::Sms {
                        sender: sender.into(),
                        external_id,
                    }),
                    _ => Err(ModelError::MissingExternalId),
                }
            }
        }
    }

    pub fn origin(&self) -> MessageOrigin {
        match self {
            Provenance::App { .. } => MessageOrigin::App,
            Provenance::Sms { .. } => MessageOrigin::Sms,
        }
    }

    /// The sender as a member reference.
    pub fn sender(&self) -> MemberRef {
        match self {
            Provenance::App { sender, .. } => MemberRef::User(sender.clone()),
            Provenance::Sms { sender, .. } => MemberRef::Participant(sender.clone()),
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        match self {
            Provenance::App { external_id, .. } => external_id.as_deref(),
            Provenance::Sms { external_id, .. } => Some(external_id),
        }
    }

    /// Delivery status; always `None` for SMS-origin messages.
    pub fn status(&self) -> Option<DeliveryStatus> {
        match self {
            Provenance::App { status, .. } => *status,
            Provenance::Sms { .. } => None,
        }
    }
}

/// One entry in a group's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub group_id: GroupId,
    pub content: String,
    #[serde(flatten)]
    pub provenance: Provenance,
    pub created_at: String,
    pub updated_at: String,
}

impl Message {
    pub fn origin(&self) -> MessageOrigin {
        self.provenance.origin()
    }

    pub fn is_app_origin(&self) -> bool {
        self.origin() == MessageOrigin::App
    }
}

/// A message about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub group_id: GroupId,
    pub content: String,
    pub provenance: Provenance,
}

impl NewMessage {
    /// App-origin message, status `pending` until dispatched.
    pub fn app(group_id: GroupId, sender: UserId, content: impl Into<String>) -> Self {
        Self {
            group_id,
            content: content.into(),
            provenance: Provenance::App {
                sender,
                status: Some(DeliveryStatus::Pending),
                external_id: None,
            },
        }
    }

    /// SMS-origin message stored exactly as received.
    pub fn sms(
        group_id: GroupId,
        sender: ParticipantId,
        content: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let external_id = external_id.into();
        if external_id.is_empty() {
            return Err(ModelError::MissingExternalId);
        }
        Ok(Self {
            group_id,
            content: content.into(),
            provenance: Provenance::Sms {
                sender,
                external_id,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_provenance_from_columns() {
        let p = Provenance::from_columns("app", Some("u1".into()), None, Some("sent"), None).unwrap();
        assert_eq!(p.origin(), MessageOrigin::App);
        assert_eq!(p.status(), Some(DeliveryStatus::Sent));
        assert_eq!(p.external_id(), None);
        assert_eq!(p.sender(), MemberRef::User("u1".into()));

        let unset = Provenance::from_columns("app", Some("u1".into()), None, None, None).unwrap();
        assert_eq!(unset.status(), None);
    }

    #[test]
    fn test_sms_provenance_from_columns() {
        let p = Provenance::from_columns("sms", None, Some("p1".into()), None, Some("SM123".into()))
            .unwrap();
        assert_eq!(p.origin(), MessageOrigin::Sms);
        assert_eq!(p.external_id(), Some("SM123"));
        assert_eq!(p.status(), None);
        assert_eq!(p.sender(), MemberRef::Participant("p1".into()));
    }

    #[test]
    fn test_sender_exclusivity_enforced() {
        assert_eq!(
            Provenance::from_columns("app", Some("u1".into()), Some("p1".into()), None, None),
            Err(ModelError::SenderMismatch { origin: "app" })
        );
        assert_eq!(
            Provenance::from_columns("app", None, None, None, None),
            Err(ModelError::SenderMismatch { origin: "app" })
        );
        assert_eq!(
            Provenance::from_columns("app", None, Some("p1".into()), None, None),
            Err(ModelError::SenderMismatch { origin: "app" })
        );
        assert_eq!(
            Provenance::from_columns("sms", Some("u1".into()), None, None, Some("SM1".into())),
            Err(ModelError::SenderMismatch { origin: "sms" })
        );
    }

    #[test]
    fn test_sms_requires_external_id_and_no_status() {
        assert_eq!(
            Provenance::from_columns("sms", None, Some("p1".into()), None, None),
            Err(ModelError::MissingExternalId)
        );
        assert_eq!(
            Provenance::from_columns("sms", None, Some("p1".into()), Some("sent"), Some("SM1".into())),
            Err(ModelError::UnexpectedStatus)
        );
        assert_eq!(
            NewMessage::sms("g1".into(), "p1".into(), "hi", ""),
            Err(ModelError::MissingExternalId)
        );
    }

    #[test]
    fn test_unknown_origin_and_status() {
        assert_eq!(
            Provenance::from_columns("email", Some("u1".into()), None, None, None),
            Err(ModelError::UnknownOrigin("email".into()))
        );
        assert!(matches!(
            Provenance::from_columns("app", Some("u1".into()), None, Some("bogus"), None),
            Err(ModelError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_member_ref_columns() {
        let user = MemberRef::from_columns(Some("u1".into()), None).unwrap();
        assert_eq!(user.columns(), (Some("u1"), None));

        let participant = MemberRef::from_columns(None, Some("p1".into())).unwrap();
        assert_eq!(participant.columns(), (None, Some("p1")));

        assert_eq!(MemberRef::from_columns(None, None), Err(ModelError::MemberMismatch));
        assert_eq!(
            MemberRef::from_columns(Some("u1".into()), Some("p1".into())),
            Err(ModelError::MemberMismatch)
        );
    }

    #[test]
    fn test_new_app_message_is_pending() {
        let msg = NewMessage::app("g1".into(), "u1".into(), "Hello");
        assert_eq!(msg.provenance.status(), Some(DeliveryStatus::Pending));
        assert_eq!(msg.provenance.external_id(), None);
    }

    #[test]
    fn test_message_serializes_flat() {
        let msg = Message {
            id: "m1".into(),
            group_id: "g1".into(),
            content: "Hello".into(),
            provenance: Provenance::Sms {
                sender: "p1".into(),
                external_id: "SM123".into(),
            },
            created_at: "2024-01-01 00:00:00".into(),
            updated_at: "2024-01-01 00:00:00".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["origin"], "sms");
        assert_eq!(json["sender"], "p1");
        assert_eq!(json["external_id"], "SM123");
    }
}
