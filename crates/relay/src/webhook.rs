//! Carrier webhook requests and their authentication.

use carrier_gateway::validate_signature;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::error::{RelayError, Result};

/// One form-encoded webhook delivery from the carrier.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    /// The public URL the carrier signed against.
    pub url: String,
    /// Every form field, in arrival order.
    pub params: Vec<(String, String)>,
    /// Value of the signature header, if sent.
    pub signature: Option<String>,
}

impl WebhookRequest {
    pub fn new(url: impl Into<String>, params: Vec<(String, String)>, signature: Option<String>) -> Self {
        Self {
            url: url.into(),
            params,
            signature,
        }
    }

    /// First value of a form field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// A field that must be present and non-empty.
    pub fn required(&self, key: &str) -> Result<&str> {
        match self.field(key).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(RelayError::Malformed(format!("missing field {key}"))),
        }
    }
}

/// Checks webhook signatures with the account auth token.
#[derive(Debug, Clone)]
pub struct WebhookAuth {
    auth_token: Option<SecretString>,
    skip_verification: bool,
}

impl WebhookAuth {
    /// Verify every request; a missing token fails as misconfiguration.
    pub fn new(auth_token: Option<SecretString>) -> Self {
        Self {
            auth_token,
            skip_verification: false,
        }
    }

    /// Accept unsigned requests. Only for non-production environments.
    pub fn insecure_skip_verification(mut self) -> Self {
        self.skip_verification = true;
        self
    }

    pub fn verify(&self, request: &WebhookRequest) -> Result<()> {
        if self.skip_verification {
            return Ok(());
        }

        let token = self
            .auth_token
            .as_ref()
            .ok_or(RelayError::MissingConfig("carrier auth token"))?;

        let signature = request.signature.as_deref().ok_or_else(|| {
            warn!(url = %request.url, "Webhook without signature");
            RelayError::Unauthorized
        })?;

        if validate_signature(token.expose_secret(), &request.url, &request.params, signature) {
            Ok(())
        } else {
            warn!(url = %request.url, "Webhook signature mismatch");
            Err(RelayError::Unauthorized)
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use carrier_gateway::compute_signature;

    pub const TOKEN: &str = "test-auth-token";

    pub fn auth() -> WebhookAuth {
        WebhookAuth::new(Some(SecretString::from(TOKEN.to_string())))
    }

    /// A request signed the way the carrier would sign it.
    pub fn signed(url: &str, fields: &[(&str, &str)]) -> WebhookRequest {
        let params: Vec<(String, String)> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let signature = compute_signature(TOKEN, url, &params).unwrap();
        WebhookRequest::new(url, params, Some(signature))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    const URL: &str = "https://bridge.example/webhooks/sms";

    #[test]
    fn test_signed_request_verifies() {
        let request = signed(URL, &[("From", "+15551234567"), ("Body", "hi")]);
        auth().verify(&request).unwrap();
    }

    #[test]
    fn test_bad_or_missing_signature_is_unauthorized() {
        let mut request = signed(URL, &[("From", "+15551234567")]);
        request.params.push(("Body".into(), "injected".into()));
        assert!(matches!(auth().verify(&request), Err(RelayError::Unauthorized)));

        request.signature = None;
        assert!(matches!(auth().verify(&request), Err(RelayError::Unauthorized)));
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let request = signed(URL, &[("From", "+15551234567")]);
        let result = WebhookAuth::new(None).verify(&request);
        assert!(matches!(result, Err(RelayError::MissingConfig(_))));
    }

    #[test]
    fn test_skip_verification_accepts_unsigned() {
        let request = WebhookRequest::new(URL, vec![], None);
        WebhookAuth::new(None)
            .insecure_skip_verification()
            .verify(&request)
            .unwrap();
    }

    #[test]
    fn test_required_field() {
        let request = WebhookRequest::new(
            URL,
            vec![("From".into(), "+15551234567".into()), ("Body".into(), "  ".into())],
            None,
        );
        assert_eq!(request.required("From").unwrap(), "+15551234567");
        assert!(matches!(request.required("Body"), Err(RelayError::Malformed(_))));
        assert!(matches!(request.required("To"), Err(RelayError::Malformed(_))));
    }
}
