//! Core types and rules for BridgeChat.
//!
//! BridgeChat keeps one message timeline per group, shared between
//! authenticated app users and phone-only SMS participants. This crate holds
//! the pieces every other crate agrees on:
//!
//! - [`E164`] phone numbers and the validation helpers in [`phone`] and [`content`]
//! - The domain entities ([`Group`], [`Membership`], [`Message`], ...)
//! - [`DeliveryStatus`] and the worst-case [`StatusAggregate`]
//! - Membership authority predicates in [`authority`]
//! - The [`Capability`] a caller writes with
//!
//! Nothing here performs I/O.
//!
//! # Example
//!
//! ```rust
//! use bridge_core::{normalize_to_e164, sanitize_for_sms, validate_message_content};
//!
//! let phone = normalize_to_e164("(555) 123-4567", "1").unwrap();
//! assert_eq!(phone.as_str(), "+15551234567");
//!
//! let text = validate_message_content("  \u{201c}hi\u{201d}  ").unwrap();
//! assert_eq!(sanitize_for_sms(&text), "\"hi\"");
//! ```

pub mod authority;
mod capability;
pub mod content;
mod error;
mod ids;
mod model;
pub mod phone;
pub mod segments;
mod status;

pub use authority::{can_remove_member, Permission};
pub use capability::Capability;
pub use content::{sanitize_for_sms, validate_message_content, MAX_MESSAGE_LENGTH};
pub use error::{ModelError, ValidationError};
pub use ids::{GroupId, MembershipId, MessageId, ParticipantId, UserId};
pub use model::{
    Group, MemberRef, Membership, Message, MessageOrigin, NewMessage, Provenance, Role,
    SmsParticipant, User,
};
pub use phone::{normalize_to_e164, validate_phone_number, E164, DEFAULT_COUNTRY_CODE};
pub use segments::{estimate_segments, SegmentInfo, SmsEncoding};
pub use status::{DeliveryStatus, StatusAggregate};
