//! Error types for relay operations.

use bridge_core::{ModelError, ValidationError};
use carrier_gateway::GatewayError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while relaying messages.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Webhook signature missing or wrong.
    #[error("invalid webhook signature")]
    Unauthorized,

    /// A secret or URL the operation needs is not configured.
    #[error("missing server configuration: {0}")]
    MissingConfig(&'static str),

    /// Request is missing required fields.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// User input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Actor lacks permission for the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Persistence layer failure.
    #[error(transparent)]
    Database(DatabaseError),

    /// Carrier call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Whole dispatch failed before completing.
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),
}

// Permission and lookup failures keep their meaning across the boundary.
impl From<DatabaseError> for RelayError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Forbidden(reason) => RelayError::Forbidden(reason),
            DatabaseError::NotFound { entity, id } => RelayError::NotFound(format!("{entity} {id}")),
            DatabaseError::AlreadyExists { entity, id } => {
                RelayError::AlreadyExists(format!("{entity} {id}"))
            }
            other => RelayError::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
