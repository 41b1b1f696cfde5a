//! Request extractors.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bridge_core::UserId;

use crate::error::ApiError;

/// Header carrying the authenticated user id, set by the auth proxy.
pub const USER_HEADER: &str = "x-bridge-user";

/// The app user a request acts for.
#[derive(Debug, Clone)]
pub struct ActingUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| ActingUser(UserId::from(v)))
            .ok_or(ApiError::Unauthenticated)
    }
}
