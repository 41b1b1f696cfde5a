//! Carrier REST client.

use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::config::CarrierConfig;
use crate::error::GatewayError;
use crate::types::{ApiErrorBody, MessageResource, SendSms};

/// Client for the carrier's message API.
#[derive(Clone)]
pub struct CarrierClient {
    http: Client,
    config: CarrierConfig,
}

impl CarrierClient {
    /// Build a client. No request is made until the first send.
    pub fn new(config: CarrierConfig) -> Result<Self, GatewayError> {
        if config.account_sid.is_empty() {
            return Err(GatewayError::Config("account sid is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CarrierConfig {
        &self.config
    }

    /// Send one SMS. The configured status callback is attached unless the
    /// params already carry one.
    pub async fn send_sms(&self, params: &SendSms) -> Result<MessageResource, GatewayError> {
        let mut params = params.clone();
        if params.status_callback.is_none() {
            params.status_callback = self.config.status_callback.clone();
        }

        let url = self.config.messages_url();
        debug!(to = %params.to, from = %params.from, "Carrier send: {}", url);

        let resp = self
            .http
            .post(&url)
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
            let (code, message) = match body {
                Some(body) => (body.code, body.message.unwrap_or_else(|| text.clone())),
                None => (None, text),
            };
            warn!(status = status.as_u16(), ?code, "Carrier rejected send: {}", message);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let resource: MessageResource = resp.json().await?;
        debug!(sid = %resource.sid, status = %resource.status, "Carrier accepted send");
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> CarrierClient {
        let config = CarrierConfig::new("AC123", "secret").with_api_base(server.base_url());
        CarrierClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_send_sms_posts_form_with_basic_auth() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST)
                .path("/2010-04-01/Accounts/AC123/Messages.json")
                .header("authorization", "Basic QUMxMjM6c2VjcmV0")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("From=%2B15550000001&To=%2B15551234567&Body=Ana%3A+hi");
            then.status(201)
                .json_body(json!({"sid": "SM1", "status": "queued", "error_code": null}));
        });

        let sent = client_for(&server)
            .send_sms(&SendSms::new("+15550000001", "+15551234567", "Ana: hi"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(sent.sid, "SM1");
        assert_eq!(sent.status, "queued");
        assert_eq!(sent.error_code, None);
    }

    #[tokio::test]
    async fn test_send_sms_attaches_status_callback() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST).path("/2010-04-01/Accounts/AC123/Messages.json").body(
                "From=%2B15550000001&To=%2B15551234567&Body=hi&StatusCallback=https%3A%2F%2Fbridge.example%2Fwebhooks%2Fstatus",
            );
            then.status(201).json_body(json!({"sid": "SM2", "status": "accepted"}));
        });

        let config = CarrierConfig::new("AC123", "secret")
            .with_api_base(server.base_url())
            .with_status_callback("https://bridge.example/webhooks/status");
        let sent = CarrierClient::new(config)
            .unwrap()
            .send_sms(&SendSms::new("+15550000001", "+15551234567", "hi"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(sent.sid, "SM2");
    }

    #[tokio::test]
    async fn test_send_sms_maps_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::POST);
            then.status(400)
                .json_body(json!({"code": 21211, "message": "Invalid 'To' Phone Number", "status": 400}));
        });

        let err = client_for(&server)
            .send_sms(&SendSms::new("+15550000001", "+1555", "hi"))
            .await
            .unwrap_err();

        match err {
            GatewayError::Api { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(21211));
                assert!(message.contains("Invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_account_sid_rejected() {
        let result = CarrierClient::new(CarrierConfig::new("", "secret"));
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }
}
