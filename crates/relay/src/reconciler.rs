//! Delivery status callbacks.
//!
//! Each callback overwrites the stored status with the mapped carrier
//! status. Callbacks arrive without ordering guarantees, so a later one
//! may move a message "backwards"; that is accepted.

use bridge_core::{Capability, DeliveryStatus, MessageId};
use tracing::{info, warn};

use database::DatabaseError;

use crate::error::Result;
use crate::store::MessageStore;
use crate::webhook::{WebhookAuth, WebhookRequest};

/// Parsed status callback fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub external_id: String,
    /// Raw carrier status string.
    pub carrier_status: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl StatusUpdate {
    /// Extract the callback fields. `MessageSid` and `MessageStatus` are required.
    pub fn from_request(request: &WebhookRequest) -> Result<Self> {
        let optional = |key: &str| {
            request
                .field(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            external_id: request.required("MessageSid")?.to_string(),
            carrier_status: request.required("MessageStatus")?.to_string(),
            error_code: optional("ErrorCode"),
            error_message: optional("ErrorMessage"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Updated {
        message_id: MessageId,
        status: DeliveryStatus,
    },
    /// No app-origin message carries the identifier.
    Unknown,
}

/// Applies carrier status callbacks with the service capability.
pub struct StatusReconciler<S> {
    store: S,
    auth: WebhookAuth,
}

impl<S: MessageStore> StatusReconciler<S> {
    pub fn new(store: S, auth: WebhookAuth) -> Self {
        Self { store, auth }
    }

    /// Authenticate and apply one callback.
    pub async fn handle(&self, request: &WebhookRequest) -> Result<Reconciliation> {
        self.auth.verify(request)?;
        let update = StatusUpdate::from_request(request)?;
        self.apply(&update).await
    }

    pub async fn apply(&self, update: &StatusUpdate) -> Result<Reconciliation> {
        let status = DeliveryStatus::from_carrier(&update.carrier_status);

        if update.error_code.is_some() || update.error_message.is_some() {
            warn!(
                external_id = %update.external_id,
                error_code = update.error_code.as_deref().unwrap_or_default(),
                "Carrier reported delivery error: {}",
                update.error_message.as_deref().unwrap_or_default()
            );
        }

        let message = match self.store.message_by_external_id(&update.external_id).await? {
            Some(message) if message.is_app_origin() => message,
            Some(_) | None => {
                info!(
                    external_id = %update.external_id,
                    status = %update.carrier_status,
                    "Status callback for unknown message, ignoring"
                );
                return Ok(Reconciliation::Unknown);
            }
        };

        match self
            .store
            .record_delivery(&Capability::Service, &message.id, None, status)
            .await
        {
            Ok(()) => {}
            Err(DatabaseError::NotFound { .. }) => {
                info!(
                    message_id = %message.id,
                    external_id = %update.external_id,
                    "Message removed before status update, ignoring"
                );
                return Ok(Reconciliation::Unknown);
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            message_id = %message.id,
            external_id = %update.external_id,
            status = %status.as_str(),
            "Reconciled delivery status"
        );
        Ok(Reconciliation::Updated {
            message_id: message.id,
            status,
        })
    }
}
