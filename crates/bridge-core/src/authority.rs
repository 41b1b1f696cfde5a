//! Membership authority: what a role may do inside a group.
//!
//! Every predicate is a pure function of roles. Looking the roles up is the
//! store's job.

use crate::model::{MemberRef, Role};

/// Group-scoped actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Write an app-origin message into the timeline.
    SendMessage,
    /// Add users or SMS participants.
    AddMember,
    /// Change the group's routing phone number.
    EditRoutingNumber,
    /// Delete the group and everything in it.
    DeleteGroup,
}

impl Permission {
    /// Whether an actor holding `role` (or no membership) may do this.
    pub fn allowed_for(&self, role: Option<Role>) -> bool {
        let Some(role) = role else {
            return false;
        };
        match self {
            Permission::SendMessage => true,
            Permission::AddMember | Permission::EditRoutingNumber => can_manage(role),
            Permission::DeleteGroup => role == Role::Owner,
        }
    }
}

/// Owners and admins manage membership and routing.
pub fn can_manage(role: Role) -> bool {
    matches!(role, Role::Owner | Role::Admin)
}

/// Whether `actor` may remove `target` from a group.
///
/// Self-removal is always allowed, whatever the role. Otherwise owners are
/// never removable, and only owners or admins may remove anyone. A sole
/// owner leaving leaves the group ownerless; no succession happens here.
pub fn can_remove_member(
    actor: &MemberRef,
    actor_role: Option<Role>,
    target: &MemberRef,
    target_role: Role,
) -> bool {
    if actor == target {
        return actor_role.is_some();
    }
    if target_role == Role::Owner {
        return false;
    }
    actor_role.is_some_and(can_manage)
}
