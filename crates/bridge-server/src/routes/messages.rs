//! Timeline routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bridge_core::{estimate_segments, GroupId, Message, SegmentInfo};
use serde::Deserialize;

use crate::error::Result;
use crate::extract::ActingUser;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    pub text: String,
}

/// Most recent messages, oldest first.
pub async fn recent_messages(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Message>>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(Json(state.groups.recent_messages(&actor, &group_id, limit).await?))
}

/// Post an app message. Delivery to SMS members is triggered separately.
pub async fn send_message(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(group_id): Path<GroupId>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let message = state
        .groups
        .send_app_message(&actor, &group_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn estimate(Json(req): Json<SegmentRequest>) -> Json<SegmentInfo> {
    Json(estimate_segments(&req.text))
}
