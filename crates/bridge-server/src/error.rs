//! Error types for the bridge server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay::RelayError;
use thiserror::Error;

/// Errors surfaced by the JSON API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No acting user on the request.
    #[error("missing user identity")]
    Unauthenticated,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl From<database::DatabaseError> for ApiError {
    fn from(err: database::DatabaseError) -> Self {
        ApiError::Relay(err.into())
    }
}

impl From<bridge_core::ValidationError> for ApiError {
    fn from(err: bridge_core::ValidationError) -> Self {
        ApiError::Relay(err.into())
    }
}

/// HTTP status for a relay error.
pub fn status_for(err: &RelayError) -> StatusCode {
    match err {
        RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
        RelayError::Malformed(_) | RelayError::Model(_) => StatusCode::BAD_REQUEST,
        RelayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RelayError::Forbidden(_) => StatusCode::FORBIDDEN,
        RelayError::NotFound(_) => StatusCode::NOT_FOUND,
        RelayError::AlreadyExists(_) => StatusCode::CONFLICT,
        RelayError::MissingConfig(_)
        | RelayError::Database(_)
        | RelayError::Gateway(_)
        | RelayError::DispatchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Infrastructure details stay in the log; clients get a generic message.
fn public_message(err: &RelayError, status: StatusCode) -> String {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {}", err);
        match err {
            RelayError::MissingConfig(_) => "missing server configuration".to_string(),
            RelayError::DispatchFailed(_) => "failed to send message".to_string(),
            _ => "internal error".to_string(),
        }
    } else {
        err.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Relay(err) => {
                let status = status_for(err);
                (status, public_message(err, status))
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Webhook failures, answered in plain text.
#[derive(Debug)]
pub struct WebhookError(pub RelayError);

impl From<RelayError> for WebhookError {
    fn from(err: RelayError) -> Self {
        WebhookError(err)
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        (status, public_message(&self.0, status)).into_response()
    }
}

/// Result type for JSON API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
