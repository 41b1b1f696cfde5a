//! Message relay between the app timeline and SMS.
//!
//! This crate holds the three message paths and the user-facing group
//! operations:
//!
//! - [`InboundRouter`] admits carrier-delivered SMS into group timelines
//! - [`Dispatcher`] fans an app message out to a group's SMS participants
//! - [`StatusReconciler`] applies asynchronous delivery status callbacks
//! - [`GroupService`] manages groups, memberships and app messages for a user
//!
//! # Architecture
//!
//! ```text
//!  carrier webhook ──▶ InboundRouter ──┐
//!                                      │ (service capability)
//!  status callback ──▶ StatusReconciler├──▶ MessageStore (database)
//!                                      │
//!  dispatch trigger ─▶ Dispatcher ─────┘
//!                          │
//!                          └──▶ SmsGateway (carrier REST API)
//!
//!  app user ─────────▶ GroupService ──────▶ database (end-user capability)
//! ```
//!
//! Each path is stateless: it reads and writes the store for one request
//! and holds nothing in memory between requests.

pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod groups;
pub mod reconciler;
pub mod router;
pub mod store;
pub mod webhook;

pub use dispatcher::{compose_body, DispatchOutcome, DispatchReport, Dispatcher, FALLBACK_SENDER_LABEL};
pub use error::{RelayError, Result};
pub use gateway::{SentSms, SmsGateway};
pub use groups::GroupService;
pub use reconciler::{Reconciliation, StatusReconciler, StatusUpdate};
pub use router::{Admission, IgnoreReason, InboundRouter};
pub use store::MessageStore;
pub use webhook::{WebhookAuth, WebhookRequest};
