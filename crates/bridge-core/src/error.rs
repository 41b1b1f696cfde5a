//! Error types for validation and model construction.

use thiserror::Error;

/// Input that cannot be accepted as a phone number or message body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Phone number is not E.164.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// Empty or whitespace-only value.
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Value exceeds its maximum length.
    #[error("{field} is too long ({actual} chars, max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// A row or value that breaks an entity invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Origin discriminant is neither "app" nor "sms".
    #[error("unknown message origin: {0}")]
    UnknownOrigin(String),

    /// Sender columns do not match the origin (both, neither, or the wrong one).
    #[error("message sender does not match origin {origin}")]
    SenderMismatch { origin: &'static str },

    /// SMS-origin message lacks its carrier identifier.
    #[error("sms-origin message requires an external identifier")]
    MissingExternalId,

    /// SMS-origin message carries a delivery status.
    #[error("sms-origin message cannot carry a delivery status")]
    UnexpectedStatus,

    /// Membership links both or neither of user and participant.
    #[error("membership must reference exactly one of user or participant")]
    MemberMismatch,

    /// Unknown enum value stored in a column.
    #[error("unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },
}
