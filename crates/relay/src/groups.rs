//! Group and timeline operations performed on behalf of an app user.
//!
//! Every method acts with the caller's end-user capability. Permission is
//! checked here against the actor's role first; the storage layer repeats
//! the membership checks for the writes it guards.

use bridge_core::{
    can_remove_member, normalize_to_e164, validate_message_content, Capability, Group, GroupId,
    MemberRef, Membership, Message, NewMessage, Permission, Role, SmsParticipant, UserId,
    ValidationError, DEFAULT_COUNTRY_CODE,
};
use database::{group, membership, message, participant, Database};
use tracing::info;

use crate::error::{RelayError, Result};

/// Upper bound for one timeline page.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Group management and timeline access for app users.
#[derive(Debug, Clone)]
pub struct GroupService {
    db: Database,
    default_country_code: String,
}

impl GroupService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }

    /// Country code assumed for phone numbers typed without one.
    pub fn with_default_country_code(mut self, code: impl Into<String>) -> Self {
        self.default_country_code = code.into();
        self
    }

    async fn role(&self, actor: &UserId, group_id: &GroupId) -> Result<Option<Role>> {
        Ok(membership::role_of(self.db.pool(), group_id, &MemberRef::User(actor.clone())).await?)
    }

    async fn require(&self, actor: &UserId, group_id: &GroupId, permission: Permission) -> Result<Role> {
        match self.role(actor, group_id).await? {
            Some(role) if permission.allowed_for(Some(role)) => Ok(role),
            _ => Err(RelayError::Forbidden(format!(
                "{actor} lacks {permission:?} on group {group_id}"
            ))),
        }
    }

    /// Create a group owned by `actor`.
    pub async fn create_group(&self, actor: &UserId, name: &str, routing_number: &str) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty("group name").into());
        }
        let number = normalize_to_e164(routing_number, &self.default_country_code)?;
        let group = group::create_group(self.db.pool(), name, &number, actor).await?;
        info!(group_id = %group.id, owner = %actor, "Group created");
        Ok(group)
    }

    /// Groups the actor belongs to.
    pub async fn groups(&self, actor: &UserId) -> Result<Vec<Group>> {
        Ok(group::list_groups_for_user(self.db.pool(), actor).await?)
    }

    pub async fn group(&self, actor: &UserId, group_id: &GroupId) -> Result<Group> {
        self.require(actor, group_id, Permission::SendMessage).await?;
        Ok(group::get_group(self.db.pool(), group_id).await?)
    }

    pub async fn members(&self, actor: &UserId, group_id: &GroupId) -> Result<Vec<Membership>> {
        self.require(actor, group_id, Permission::SendMessage).await?;
        Ok(membership::list_members(self.db.pool(), group_id).await?)
    }

    /// Add a phone-only participant, creating the participant record on
    /// first use of the number.
    pub async fn add_sms_member(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        phone: &str,
        display_name: &str,
    ) -> Result<(Membership, SmsParticipant)> {
        self.require(actor, group_id, Permission::AddMember).await?;
        let phone = normalize_to_e164(phone, &self.default_country_code)?;
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ValidationError::Empty("display name").into());
        }

        if let Some(existing) = participant::find_by_phone(self.db.pool(), &phone).await? {
            let member = MemberRef::Participant(existing.id.clone());
            if membership::get_membership(self.db.pool(), group_id, &member).await?.is_some() {
                return Err(RelayError::AlreadyExists(format!(
                    "participant {} in group {group_id}",
                    existing.id
                )));
            }
        }

        let (participant, created) =
            participant::find_or_create(self.db.pool(), &phone, display_name, actor).await?;
        let membership = membership::add_member(
            self.db.pool(),
            &Capability::EndUser(actor.clone()),
            group_id,
            &MemberRef::Participant(participant.id.clone()),
            Role::Member,
        )
        .await?;

        info!(group_id = %group_id, participant_id = %participant.id, created, "SMS member added");
        Ok((membership, participant))
    }

    /// Add an app user. Only an owner may grant the owner role.
    pub async fn add_user_member(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership> {
        let actor_role = self.require(actor, group_id, Permission::AddMember).await?;
        if role == Role::Owner && actor_role != Role::Owner {
            return Err(RelayError::Forbidden(format!(
                "{actor} may not grant the owner role"
            )));
        }

        let membership = membership::add_member(
            self.db.pool(),
            &Capability::EndUser(actor.clone()),
            group_id,
            &MemberRef::User(user_id.clone()),
            role,
        )
        .await?;
        info!(group_id = %group_id, user_id = %user_id, role = %role, "User member added");
        Ok(membership)
    }

    /// Remove a member, or leave when `target` is the actor.
    pub async fn remove_member(&self, actor: &UserId, group_id: &GroupId, target: &MemberRef) -> Result<()> {
        let actor_ref = MemberRef::User(actor.clone());
        let actor_role = self.role(actor, group_id).await?;
        let target_role = membership::role_of(self.db.pool(), group_id, target)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("member {target} of group {group_id}")))?;

        if !can_remove_member(&actor_ref, actor_role, target, target_role) {
            return Err(RelayError::Forbidden(format!(
                "{actor} may not remove {target} from group {group_id}"
            )));
        }

        membership::remove_member(
            self.db.pool(),
            &Capability::EndUser(actor.clone()),
            group_id,
            target,
        )
        .await?;
        Ok(())
    }

    pub async fn update_routing_number(&self, actor: &UserId, group_id: &GroupId, number: &str) -> Result<Group> {
        self.require(actor, group_id, Permission::EditRoutingNumber).await?;
        let number = normalize_to_e164(number, &self.default_country_code)?;
        Ok(group::update_routing_number(self.db.pool(), group_id, &number).await?)
    }

    /// Delete a group with its memberships and messages. Owners only.
    pub async fn delete_group(&self, actor: &UserId, group_id: &GroupId) -> Result<()> {
        self.require(actor, group_id, Permission::DeleteGroup).await?;
        group::delete_group(self.db.pool(), group_id).await?;
        info!(group_id = %group_id, by = %actor, "Group deleted");
        Ok(())
    }

    /// Post an app message. It starts `pending`; the caller triggers dispatch.
    pub async fn send_app_message(&self, actor: &UserId, group_id: &GroupId, content: &str) -> Result<Message> {
        self.require(actor, group_id, Permission::SendMessage).await?;
        let content = validate_message_content(content)?;
        let new = NewMessage::app(group_id.clone(), actor.clone(), content);
        Ok(message::insert_message(self.db.pool(), &Capability::EndUser(actor.clone()), &new).await?)
    }

    /// The latest `limit` messages, oldest first. Used to resynchronize a
    /// client after its realtime connection drops.
    pub async fn recent_messages(&self, actor: &UserId, group_id: &GroupId, limit: u32) -> Result<Vec<Message>> {
        self.require(actor, group_id, Permission::SendMessage).await?;
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Ok(message::list_recent(self.db.pool(), group_id, limit).await?)
    }
}
