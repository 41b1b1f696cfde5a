//! Error types for carrier-gateway.

use thiserror::Error;

/// Errors that can occur when talking to the carrier.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The carrier answered with a non-success status.
    #[error("carrier error {status} (code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Signing key could not be used.
    #[error("signature error: {0}")]
    Signature(String),
}
