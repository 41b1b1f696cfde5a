//! Group and membership routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bridge_core::{Group, GroupId, MemberRef, Membership, ParticipantId, Role, SmsParticipant, UserId};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::ActingUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub routing_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    pub routing_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSmsMemberRequest {
    pub phone: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserMemberRequest {
    pub user_id: UserId,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Member
}

#[derive(Debug, Serialize)]
pub struct SmsMemberAdded {
    pub membership: Membership,
    pub participant: SmsParticipant,
}

pub async fn list_groups(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
) -> Result<Json<Vec<Group>>> {
    Ok(Json(state.groups.groups(&actor).await?))
}

pub async fn create_group(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>)> {
    let group = state
        .groups
        .create_group(&actor, &req.name, &req.routing_number)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_group(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Group>> {
    Ok(Json(state.groups.group(&actor, &group_id).await?))
}

/// Change the routing number.
pub async fn update_group(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Group>> {
    let group = state
        .groups
        .update_routing_number(&actor, &group_id, &req.routing_number)
        .await?;
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode> {
    state.groups.delete_group(&actor, &group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<Membership>>> {
    Ok(Json(state.groups.members(&actor, &group_id).await?))
}

pub async fn add_sms_member(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
    Json(req): Json<AddSmsMemberRequest>,
) -> Result<(StatusCode, Json<SmsMemberAdded>)> {
    let (membership, participant) = state
        .groups
        .add_sms_member(&actor, &group_id, &req.phone, &req.display_name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SmsMemberAdded {
            membership,
            participant,
        }),
    ))
}

pub async fn add_user_member(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
    Json(req): Json<AddUserMemberRequest>,
) -> Result<(StatusCode, Json<Membership>)> {
    let membership = state
        .groups
        .add_user_member(&actor, &group_id, &req.user_id, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn remove_user_member(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
) -> Result<StatusCode> {
    state
        .groups
        .remove_member(&actor, &group_id, &MemberRef::User(user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_sms_member(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path((group_id, participant_id)): Path<(GroupId, ParticipantId)>,
) -> Result<StatusCode> {
    state
        .groups
        .remove_member(&actor, &group_id, &MemberRef::Participant(participant_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
