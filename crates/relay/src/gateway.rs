//! Outbound SMS gateway trait and the carrier implementation.

use async_trait::async_trait;
use bridge_core::E164;
use carrier_gateway::{CarrierClient, SendSms};

use crate::error::RelayError;

/// Result of one accepted outbound send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    /// Carrier-assigned message identifier.
    pub external_id: String,
    /// Initial status in the carrier's vocabulary.
    pub carrier_status: String,
}

/// Trait for sending one SMS leg.
///
/// Abstracted so the dispatcher can run against the real carrier or a
/// scripted double.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send `body` from the group's routing number to one recipient.
    async fn send_sms(&self, from: &E164, to: &E164, body: &str) -> Result<SentSms, RelayError>;
}

#[async_trait]
impl SmsGateway for CarrierClient {
    async fn send_sms(&self, from: &E164, to: &E164, body: &str) -> Result<SentSms, RelayError> {
        let params = SendSms::new(from.as_str(), to.as_str(), body);
        let resource = CarrierClient::send_sms(self, &params).await?;
        Ok(SentSms {
            external_id: resource.sid,
            carrier_status: resource.status,
        })
    }
}
