//! Profile routes for the acting user.

use axum::extract::State;
use axum::Json;
use bridge_core::{normalize_to_e164, User};
use database::user::{self, ProfileUpdate};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::extract::ActingUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn me(State(state): State<AppState>, ActingUser(actor): ActingUser) -> Result<Json<User>> {
    Ok(Json(user::get_user(state.db.pool(), &actor).await?))
}

/// Mirror the identity provider's account into the users table.
pub async fn upsert_me(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(req): Json<SignupRequest>,
) -> Result<Json<User>> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }
    let user = user::upsert_user(state.db.pool(), &actor, email, req.display_name.trim()).await?;
    Ok(Json(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<User>> {
    let phone = req
        .phone
        .as_deref()
        .map(|raw| normalize_to_e164(raw, &state.default_country_code))
        .transpose()?;
    let display_name = req.display_name.as_deref().map(str::trim);
    if display_name == Some("") {
        return Err(ApiError::BadRequest("display name cannot be blank".to_string()));
    }

    let update = ProfileUpdate {
        display_name,
        phone: phone.as_ref(),
        avatar_url: req.avatar_url.as_deref(),
    };
    Ok(Json(user::update_profile(state.db.pool(), &actor, &update).await?))
}
