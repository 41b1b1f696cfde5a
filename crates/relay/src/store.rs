//! Storage seam used by the message paths.

use async_trait::async_trait;
use bridge_core::{
    Capability, DeliveryStatus, E164, Group, GroupId, MemberRef, Message, MessageId, NewMessage,
    Role, SmsParticipant, UserId,
};
use database::{group, membership, message, participant, user, Database, DatabaseError};

type StoreResult<T> = Result<T, DatabaseError>;

/// The reads and writes the router, dispatcher and reconciler need.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn group_by_routing_number(&self, number: &E164) -> StoreResult<Option<Group>>;

    async fn group(&self, id: &GroupId) -> StoreResult<Group>;

    async fn participant_by_phone(&self, phone: &E164) -> StoreResult<Option<SmsParticipant>>;

    async fn role_of(&self, group_id: &GroupId, member: &MemberRef) -> StoreResult<Option<Role>>;

    async fn display_name(&self, user_id: &UserId) -> StoreResult<Option<String>>;

    /// SMS participants of a group, in membership order.
    async fn sms_recipients(&self, group_id: &GroupId) -> StoreResult<Vec<SmsParticipant>>;

    async fn insert_message(&self, capability: &Capability, new: &NewMessage) -> StoreResult<Message>;

    async fn message(&self, id: &MessageId) -> StoreResult<Message>;

    async fn message_by_external_id(&self, external_id: &str) -> StoreResult<Option<Message>>;

    async fn record_delivery(
        &self,
        capability: &Capability,
        id: &MessageId,
        external_id: Option<&str>,
        status: DeliveryStatus,
    ) -> StoreResult<()>;
}

#[async_trait]
impl MessageStore for Database {
    async fn group_by_routing_number(&self, number: &E164) -> StoreResult<Option<Group>> {
        group::find_by_routing_number(self.pool(), number).await
    }

    async fn group(&self, id: &GroupId) -> StoreResult<Group> {
        group::get_group(self.pool(), id).await
    }

    async fn participant_by_phone(&self, phone: &E164) -> StoreResult<Option<SmsParticipant>> {
        participant::find_by_phone(self.pool(), phone).await
    }

    async fn role_of(&self, group_id: &GroupId, member: &MemberRef) -> StoreResult<Option<Role>> {
        membership::role_of(self.pool(), group_id, member).await
    }

    async fn display_name(&self, user_id: &UserId) -> StoreResult<Option<String>> {
        user::get_display_name(self.pool(), user_id).await
    }

    async fn sms_recipients(&self, group_id: &GroupId) -> StoreResult<Vec<SmsParticipant>> {
        membership::list_sms_participants(self.pool(), group_id).await
    }

    async fn insert_message(&self, capability: &Capability, new: &NewMessage) -> StoreResult<Message> {
        message::insert_message(self.pool(), capability, new).await
    }

    async fn message(&self, id: &MessageId) -> StoreResult<Message> {
        message::get_message(self.pool(), id).await
    }

    async fn message_by_external_id(&self, external_id: &str) -> StoreResult<Option<Message>> {
        message::find_by_external_id(self.pool(), external_id).await
    }

    async fn record_delivery(
        &self,
        capability: &Capability,
        id: &MessageId,
        external_id: Option<&str>,
        status: DeliveryStatus,
    ) -> StoreResult<()> {
        message::record_delivery(self.pool(), capability, id, external_id, status).await
    }
}
