//! Inbound SMS routing.
//!
//! Decides whether a carrier-delivered SMS belongs in a group timeline.
//! After authentication and field extraction every outcome is an
//! acknowledgment: routing misses are logged and swallowed so the carrier
//! never retries them.

use bridge_core::{validate_phone_number, Capability, MemberRef, Message, NewMessage, E164};
use tracing::{debug, info};

use crate::error::Result;
use crate::store::MessageStore;
use crate::webhook::{WebhookAuth, WebhookRequest};

/// Why an authenticated inbound SMS was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Destination number routes to no group.
    UnknownGroup,
    /// Sender phone is not a known participant.
    UnknownSender,
    /// Sender is known but not in the destination group.
    NotAMember,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::UnknownGroup => "unknown_group",
            IgnoreReason::UnknownSender => "unknown_sender",
            IgnoreReason::NotAMember => "not_a_member",
        }
    }
}

/// Outcome of routing one inbound SMS.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Admitted(Message),
    Ignored(IgnoreReason),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }
}

/// Routes inbound SMS into groups with the service capability.
pub struct InboundRouter<S> {
    store: S,
    auth: WebhookAuth,
}

impl<S: MessageStore> InboundRouter<S> {
    pub fn new(store: S, auth: WebhookAuth) -> Self {
        Self { store, auth }
    }

    /// Authenticate and route one webhook delivery.
    pub async fn route(&self, request: &WebhookRequest) -> Result<Admission> {
        self.auth.verify(request)?;

        let from = request.required("From")?;
        let to = request.required("To")?;
        let external_id = request.required("MessageSid")?;
        let body = request.field("Body").unwrap_or_default();

        // Numbers that fail validation cannot match any stored E.164 value.
        let Some(to_number) = parse_number(to) else {
            info!(to = %to, "Inbound SMS to invalid number, ignoring");
            return Ok(Admission::Ignored(IgnoreReason::UnknownGroup));
        };
        let Some(group) = self.store.group_by_routing_number(&to_number).await? else {
            info!(to = %to_number, external_id = %external_id, "Inbound SMS for unknown routing number, ignoring");
            return Ok(Admission::Ignored(IgnoreReason::UnknownGroup));
        };

        let Some(from_number) = parse_number(from) else {
            info!(from = %from, "Inbound SMS from invalid number, ignoring");
            return Ok(Admission::Ignored(IgnoreReason::UnknownSender));
        };
        let Some(sender) = self.store.participant_by_phone(&from_number).await? else {
            info!(group_id = %group.id, from = %from_number, "Inbound SMS from unregistered sender, ignoring");
            return Ok(Admission::Ignored(IgnoreReason::UnknownSender));
        };

        let member = MemberRef::Participant(sender.id.clone());
        if self.store.role_of(&group.id, &member).await?.is_none() {
            info!(group_id = %group.id, participant_id = %sender.id, "Inbound SMS from non-member, ignoring");
            return Ok(Admission::Ignored(IgnoreReason::NotAMember));
        }

        let new = NewMessage::sms(group.id.clone(), sender.id.clone(), body, external_id)?;
        let message = self.store.insert_message(&Capability::Service, &new).await?;

        debug!(
            message_id = %message.id,
            group_id = %group.id,
            external_id = %external_id,
            "Admitted inbound SMS"
        );
        Ok(Admission::Admitted(message))
    }
}

fn parse_number(raw: &str) -> Option<E164> {
    validate_phone_number(raw).ok()
}
