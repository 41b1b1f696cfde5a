//! Credentials a caller writes with.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// The capability a store write is performed under.
///
/// `EndUser` writes are subject to per-row membership checks. `Service` is
/// the trusted internal credential used by carrier-facing paths (inbound
/// admission, status reconciliation, dispatch bookkeeping) and skips them.
/// There is no implicit fallback from one to the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Capability {
    EndUser(UserId),
    Service,
}

impl Capability {
    pub fn end_user(user_id: impl Into<UserId>) -> Self {
        Capability::EndUser(user_id.into())
    }

    /// The acting user, if this is an end-user capability.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Capability::EndUser(id) => Some(id),
            Capability::Service => None,
        }
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Capability::Service)
    }
}
