//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Write rejected for the capability it was attempted with.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Stored row breaks a domain invariant.
    #[error("invalid stored {entity}: {reason}")]
    Corrupt { entity: &'static str, reason: String },
}

impl DatabaseError {
    /// Map a failed insert/update, turning unique violations into `AlreadyExists`.
    pub(crate) fn on_write(err: sqlx::Error, entity: &'static str, id: impl Into<String>) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.into(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }

    pub(crate) fn corrupt(entity: &'static str, reason: impl ToString) -> Self {
        DatabaseError::Corrupt {
            entity,
            reason: reason.to_string(),
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
