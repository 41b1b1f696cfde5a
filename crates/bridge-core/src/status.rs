//! Delivery status vocabulary and multi-recipient aggregation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Outbound delivery state of an app-origin message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Queued,
    Sent,
    Delivered,
    Failed,
    Undelivered,
}

impl DeliveryStatus {
    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Queued => "queued",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Undelivered => "undelivered",
        }
    }

    /// Map the carrier's status vocabulary onto ours.
    ///
    /// Unrecognized values map to [`DeliveryStatus::Pending`].
    pub fn from_carrier(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "accepted" | "queued" | "sending" => DeliveryStatus::Queued,
            "sent" => DeliveryStatus::Sent,
            "delivered" => DeliveryStatus::Delivered,
            "failed" => DeliveryStatus::Failed,
            "undelivered" => DeliveryStatus::Undelivered,
            _ => DeliveryStatus::Pending,
        }
    }

    /// Terminal failure class (`failed` or `undelivered`).
    pub fn is_failure(&self) -> bool {
        matches!(self, DeliveryStatus::Failed | DeliveryStatus::Undelivered)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = ModelError;

    /// Parse a stored status. Strict, unlike [`DeliveryStatus::from_carrier`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "queued" => Ok(DeliveryStatus::Queued),
            "sent" => Ok(DeliveryStatus::Sent),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "failed" => Ok(DeliveryStatus::Failed),
            "undelivered" => Ok(DeliveryStatus::Undelivered),
            other => Err(ModelError::UnknownValue {
                kind: "delivery status",
                value: other.to_string(),
            }),
        }
    }
}

/// Running worst-case status across the recipients of one message.
///
/// Starts at `delivered`. A failure class status is sticky once observed;
/// otherwise the latest non-`delivered` status wins. A recipient whose send
/// errored out forces `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusAggregate {
    current: DeliveryStatus,
}

impl StatusAggregate {
    pub fn new() -> Self {
        Self {
            current: DeliveryStatus::Delivered,
        }
    }

    /// Fold in the status returned by one successful send.
    pub fn observe(&mut self, status: DeliveryStatus) {
        if self.current.is_failure() {
            return;
        }
        if status != DeliveryStatus::Delivered {
            self.current = status;
        }
    }

    /// Fold in a send that raised instead of returning a status.
    pub fn observe_error(&mut self) {
        self.current = DeliveryStatus::Failed;
    }

    pub fn status(&self) -> DeliveryStatus {
        self.current
    }
}

impl Default for StatusAggregate {
    fn default() -> Self {
        Self::new()
    }
}
