//! Configuration types for carrier-gateway.

use secrecy::SecretString;

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Credentials and endpoints for the carrier account.
#[derive(Debug, Clone)]
pub struct CarrierConfig {
    /// REST API base URL, without trailing slash.
    pub api_base: String,
    /// Account identifier, also the basic-auth user.
    pub account_sid: String,
    /// Auth token: basic-auth password and webhook signing key.
    pub auth_token: SecretString,
    /// Sent as `StatusCallback` on every outbound message when set.
    pub status_callback: Option<String>,
}

impl CarrierConfig {
    /// Create a configuration against the default API base.
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            account_sid: account_sid.into(),
            auth_token: SecretString::from(auth_token.into()),
            status_callback: None,
        }
    }

    /// Override the API base (e.g. a local mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_status_callback(mut self, url: impl Into<String>) -> Self {
        self.status_callback = Some(url.into());
        self
    }

    /// Get the message creation endpoint URL.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}
