//! Outbound delivery of app-origin messages to a group's SMS participants.

use bridge_core::{
    sanitize_for_sms, Capability, DeliveryStatus, GroupId, Message, MessageId, Provenance,
    StatusAggregate,
};
use tracing::{debug, error, info, warn};

use crate::error::{RelayError, Result};
use crate::gateway::SmsGateway;
use crate::store::MessageStore;

/// Prefix used when the sender has no usable display name.
pub const FALLBACK_SENDER_LABEL: &str = "BridgeChat user";

/// Result of a dispatch that ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Recipients the carrier accepted.
    pub sent: usize,
    /// Recipients attempted.
    pub total: usize,
    /// Aggregate status persisted onto the message.
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched(DispatchReport),
    /// The message is not app-origin; nothing to deliver.
    Skipped,
}

/// Fans one app-origin message out over SMS.
pub struct Dispatcher<S, G> {
    store: S,
    gateway: G,
}

impl<S: MessageStore, G: SmsGateway> Dispatcher<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// Deliver a message. A message that does not belong to `group_id` is
    /// rejected untouched. Any later failure outside a single recipient's
    /// send marks the message failed (best effort) and reports `DispatchFailed`.
    pub async fn dispatch(&self, message_id: &MessageId, group_id: &GroupId) -> Result<DispatchOutcome> {
        let message = match self.store.message(message_id).await {
            Ok(message) => message,
            Err(err) => {
                error!(message_id = %message_id, "Dispatch lookup failed: {}", err);
                return Err(RelayError::DispatchFailed(err.to_string()));
            }
        };
        if message.group_id != *group_id {
            warn!(
                message_id = %message_id,
                group_id = %group_id,
                "Message belongs to another group, refusing dispatch"
            );
            return Err(RelayError::DispatchFailed(format!(
                "Message {message_id} not found in group {group_id}"
            )));
        }

        match self.run(&message).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(message_id = %message_id, "Dispatch failed: {}", err);
                if let Err(mark_err) = self
                    .store
                    .record_delivery(&Capability::Service, message_id, None, DeliveryStatus::Failed)
                    .await
                {
                    warn!(message_id = %message_id, "Could not mark message failed: {}", mark_err);
                }
                Err(RelayError::DispatchFailed(err.to_string()))
            }
        }
    }

    async fn run(&self, message: &Message) -> Result<DispatchOutcome> {
        let message_id = &message.id;
        let Provenance::App { sender, .. } = &message.provenance else {
            debug!(message_id = %message_id, "Not an app message, skipping dispatch");
            return Ok(DispatchOutcome::Skipped);
        };

        let group = self.store.group(&message.group_id).await?;
        let label = match self.store.display_name(sender).await? {
            Some(name) if !name.trim().is_empty() => name,
            _ => FALLBACK_SENDER_LABEL.to_string(),
        };

        let recipients = self.store.sms_recipients(&group.id).await?;
        if recipients.is_empty() {
            self.persist(message, None, DeliveryStatus::Delivered).await?;
            return Ok(DispatchOutcome::Dispatched(DispatchReport {
                sent: 0,
                total: 0,
                status: DeliveryStatus::Delivered,
            }));
        }

        let body = compose_body(&label, &message.content);
        let mut aggregate = StatusAggregate::default();
        let mut external_id: Option<String> = None;
        let mut sent = 0;

        for recipient in &recipients {
            match self
                .gateway
                .send_sms(&group.routing_number, &recipient.phone, &body)
                .await
            {
                Ok(result) => {
                    sent += 1;
                    aggregate.observe(DeliveryStatus::from_carrier(&result.carrier_status));
                    debug!(
                        message_id = %message.id,
                        participant_id = %recipient.id,
                        external_id = %result.external_id,
                        status = %result.carrier_status,
                        "SMS leg accepted"
                    );
                    external_id.get_or_insert(result.external_id);
                }
                Err(err) => {
                    warn!(
                        message_id = %message.id,
                        participant_id = %recipient.id,
                        "SMS leg failed: {}",
                        err
                    );
                    aggregate.observe_error();
                }
            }
        }

        let status = aggregate.status();
        self.persist(message, external_id.as_deref(), status).await?;

        info!(
            message_id = %message.id,
            group_id = %group.id,
            sent,
            total = recipients.len(),
            status = %status.as_str(),
            "Dispatched message"
        );

        Ok(DispatchOutcome::Dispatched(DispatchReport {
            sent,
            total: recipients.len(),
            status,
        }))
    }

    async fn persist(&self, message: &Message, external_id: Option<&str>, status: DeliveryStatus) -> Result<()> {
        self.store
            .record_delivery(&Capability::Service, &message.id, external_id, status)
            .await?;
        Ok(())
    }
}

/// `"<sender>: <sanitized content>"`.
pub fn compose_body(sender_label: &str, content: &str) -> String {
    format!("{}: {}", sender_label, sanitize_for_sms(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, FailingStore, Leg, ScriptedGateway};
    use bridge_core::NewMessage;
    use database::{message, user};

    async fn post(fx: &crate::test_support::Fixture, content: &str) -> Message {
        let new = NewMessage::app(fx.group.id.clone(), fx.owner.id.clone(), content);
        message::insert_message(fx.db.pool(), &Capability::EndUser(fx.owner.id.clone()), &new)
            .await
            .unwrap()
    }

    async fn reload(fx: &crate::test_support::Fixture, id: &MessageId) -> Message {
        message::get_message(fx.db.pool(), id).await.unwrap()
    }

    #[test]
    fn test_compose_body_sanitizes_content_only() {
        assert_eq!(
            compose_body("Ana \u{201C}A\u{201D}", "it\u{2019}s here\u{2026}"),
            "Ana \u{201C}A\u{201D}: it's here..."
        );
    }

    #[tokio::test]
    async fn test_no_sms_recipients_is_delivered_without_sends() {
        let fx = fixture(&[]).await;
        let msg = post(&fx, "app only").await;
        let gateway = ScriptedGateway::new(vec![]);
        let dispatcher = Dispatcher::new(fx.db.clone(), gateway.clone());

        let outcome = dispatcher.dispatch(&msg.id, &fx.group.id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Dispatched(DispatchReport {
                sent: 0,
                total: 0,
                status: DeliveryStatus::Delivered
            })
        );
        assert!(gateway.calls().is_empty());
        let stored = reload(&fx, &msg.id).await;
        assert_eq!(stored.provenance.status(), Some(DeliveryStatus::Delivered));
        assert_eq!(stored.provenance.external_id(), None);
    }

    #[tokio::test]
    async fn test_failure_dominates_and_first_id_is_kept() {
        let fx = fixture(&["+15551110001", "+15551110002"]).await;
        let msg = post(&fx, "hello all").await;
        let gateway = ScriptedGateway::new(vec![Leg::ok("SM-first", "sent"), Leg::Error]);
        let dispatcher = Dispatcher::new(fx.db.clone(), gateway.clone());

        let outcome = dispatcher.dispatch(&msg.id, &fx.group.id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Dispatched(DispatchReport {
                sent: 1,
                total: 2,
                status: DeliveryStatus::Failed
            })
        );
        let stored = reload(&fx, &msg.id).await;
        assert_eq!(stored.provenance.status(), Some(DeliveryStatus::Failed));
        assert_eq!(stored.provenance.external_id(), Some("SM-first"));
    }

    #[tokio::test]
    async fn test_all_queued_aggregates_to_queued() {
        let fx = fixture(&["+15551110001", "+15551110002", "+15551110003"]).await;
        let msg = post(&fx, "queue me").await;
        let gateway = ScriptedGateway::new(vec![
            Leg::ok("SM1", "queued"),
            Leg::ok("SM2", "queued"),
            Leg::ok("SM3", "queued"),
        ]);
        let dispatcher = Dispatcher::new(fx.db.clone(), gateway.clone());

        let outcome = dispatcher.dispatch(&msg.id, &fx.group.id).await.unwrap();

        let DispatchOutcome::Dispatched(report) = outcome else {
            panic!("expected dispatch");
        };
        assert_eq!(report.sent, 3);
        assert_eq!(report.status, DeliveryStatus::Queued);
        assert_eq!(reload(&fx, &msg.id).await.provenance.external_id(), Some("SM1"));
    }

    #[tokio::test]
    async fn test_failure_is_sticky_over_later_success() {
        let fx = fixture(&["+15551110001", "+15551110002"]).await;
        let msg = post(&fx, "x").await;
        let gateway = ScriptedGateway::new(vec![Leg::ok("SM1", "undelivered"), Leg::ok("SM2", "delivered")]);
        let dispatcher = Dispatcher::new(fx.db.clone(), gateway);

        let DispatchOutcome::Dispatched(report) = dispatcher.dispatch(&msg.id, &fx.group.id).await.unwrap() else {
            panic!("expected dispatch");
        };
        assert_eq!(report.status, DeliveryStatus::Undelivered);
    }

    #[tokio::test]
    async fn test_body_and_numbers_sent_to_each_recipient() {
        let fx = fixture(&["+15551110001", "+15551110002"]).await;
        let msg = post(&fx, "see you \u{2014} 5pm").await;
        let gateway = ScriptedGateway::new(vec![Leg::ok("SM1", "sent"), Leg::ok("SM2", "sent")]);
        let dispatcher = Dispatcher::new(fx.db.clone(), gateway.clone());

        dispatcher.dispatch(&msg.id, &fx.group.id).await.unwrap();

        let calls = gateway.calls();
        let to: Vec<&str> = calls.iter().map(|c| c.to.as_str()).collect();
        assert_eq!(to, vec!["+15551110001", "+15551110002"]);
        for call in &calls {
            assert_eq!(call.from, fx.group.routing_number);
            assert_eq!(call.body, "Ana: see you - 5pm");
        }
    }

    #[tokio::test]
    async fn test_blank_display_name_uses_fallback_label() {
        let fx = fixture(&["+15551110001"]).await;
        user::update_profile(
            fx.db.pool(),
            &fx.owner.id,
            &user::ProfileUpdate {
                display_name: Some(" "),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let msg = post(&fx, "hi").await;
        let gateway = ScriptedGateway::new(vec![Leg::ok("SM1", "sent")]);

        Dispatcher::new(fx.db.clone(), gateway.clone())
            .dispatch(&msg.id, &fx.group.id)
            .await
            .unwrap();

        assert_eq!(gateway.calls()[0].body, format!("{FALLBACK_SENDER_LABEL}: hi"));
    }

    #[tokio::test]
    async fn test_sms_origin_message_is_skipped() {
        let fx = fixture(&["+15551110001"]).await;
        let new = NewMessage::sms(fx.group.id.clone(), fx.participants[0].id.clone(), "in", "SMin").unwrap();
        let inbound = message::insert_message(fx.db.pool(), &Capability::Service, &new)
            .await
            .unwrap();
        let gateway = ScriptedGateway::new(vec![]);

        let outcome = Dispatcher::new(fx.db.clone(), gateway.clone())
            .dispatch(&inbound.id, &fx.group.id)
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_infrastructure_failure_marks_message_failed() {
        let fx = fixture(&["+15551110001"]).await;
        let msg = post(&fx, "hi").await;
        let store = FailingStore::recipients_unavailable(fx.db.clone());
        let gateway = ScriptedGateway::new(vec![Leg::ok("SM1", "sent")]);

        let result = Dispatcher::new(store, gateway.clone())
            .dispatch(&msg.id, &fx.group.id)
            .await;

        assert!(matches!(result, Err(RelayError::DispatchFailed(_))));
        assert!(gateway.calls().is_empty());
        assert_eq!(
            reload(&fx, &msg.id).await.provenance.status(),
            Some(DeliveryStatus::Failed)
        );
    }

    #[tokio::test]
    async fn test_message_from_another_group_is_left_untouched() {
        let fx = fixture(&["+15551110001"]).await;
        let other = fx.second_group("+15550000002").await;
        let new = NewMessage::app(other.id.clone(), fx.owner.id.clone(), "elsewhere");
        let foreign = message::insert_message(fx.db.pool(), &Capability::EndUser(fx.owner.id.clone()), &new)
            .await
            .unwrap();
        message::record_delivery(
            fx.db.pool(),
            &Capability::Service,
            &foreign.id,
            Some("SM-other"),
            DeliveryStatus::Delivered,
        )
        .await
        .unwrap();
        let gateway = ScriptedGateway::new(vec![]);

        let result = Dispatcher::new(fx.db.clone(), gateway.clone())
            .dispatch(&foreign.id, &fx.group.id)
            .await;

        assert!(matches!(result, Err(RelayError::DispatchFailed(_))));
        assert!(gateway.calls().is_empty());
        let stored = reload(&fx, &foreign.id).await;
        assert_eq!(stored.provenance.status(), Some(DeliveryStatus::Delivered));
        assert_eq!(stored.provenance.external_id(), Some("SM-other"));
    }

    #[tokio::test]
    async fn test_unknown_message_is_dispatch_failure() {
        let fx = fixture(&[]).await;
        let gateway = ScriptedGateway::new(vec![]);
        let result = Dispatcher::new(fx.db.clone(), gateway)
            .dispatch(&MessageId::from("missing"), &fx.group.id)
            .await;
        assert!(matches!(result, Err(RelayError::DispatchFailed(_))));
    }
}
