//! Dispatch trigger for newly posted app messages.

use axum::extract::State;
use axum::Json;
use bridge_core::{DeliveryStatus, GroupId, MessageId};
use relay::{DispatchOutcome, Dispatcher, RelayError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::ActingUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub message_id: MessageId,
    pub group_id: GroupId,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DispatchResponse {
    Dispatched {
        sent: usize,
        total: usize,
        status: DeliveryStatus,
    },
    Skipped {
        skipped: bool,
    },
}

/// Deliver a message to the group's SMS participants.
pub async fn dispatch(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(req): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>> {
    // Members only
    state.groups.group(&actor, &req.group_id).await?;

    let carrier = state
        .carrier
        .clone()
        .ok_or(RelayError::MissingConfig("carrier credentials"))?;

    let outcome = Dispatcher::new(state.db.clone(), carrier)
        .dispatch(&req.message_id, &req.group_id)
        .await?;

    Ok(Json(match outcome {
        DispatchOutcome::Dispatched(report) => DispatchResponse::Dispatched {
            sent: report.sent,
            total: report.total,
            status: report.status,
        },
        DispatchOutcome::Skipped => DispatchResponse::Skipped { skipped: true },
    }))
}
