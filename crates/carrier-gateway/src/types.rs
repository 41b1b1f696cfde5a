//! Wire types for the carrier REST API.

use serde::{Deserialize, Serialize};

/// Form body for creating an outbound message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendSms {
    /// Sending number (the group's routing number).
    pub from: String,
    /// Recipient number.
    pub to: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_callback: Option<String>,
}

impl SendSms {
    pub fn new(from: impl Into<String>, to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            body: body.into(),
            status_callback: None,
        }
    }
}

/// The message resource returned when a send is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResource {
    pub sid: String,
    /// Carrier status vocabulary, e.g. `queued` or `sent`.
    pub status: String,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Error body returned on a rejected request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}
