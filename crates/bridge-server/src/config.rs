//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use bridge_core::DEFAULT_COUNTRY_CODE;
use carrier_gateway::config::DEFAULT_API_BASE;
use secrecy::SecretString;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    /// Webhook signatures are not checked.
    Development,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Bridge server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// Carrier account id.
    pub account_sid: Option<String>,
    /// Carrier auth token, also the webhook signing key.
    pub auth_token: Option<SecretString>,
    pub api_base: String,
    /// Public URL the carrier signs inbound SMS webhooks against.
    pub inbound_webhook_url: Option<String>,
    /// Public URL for status callbacks; also sent with each outbound SMS.
    pub status_callback_url: Option<String>,
    pub default_country_code: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BRIDGE_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:bridgechat.db?mode=rwc` |
    /// | `BRIDGE_ENV` | `production` or `development` | `production` |
    /// | `BRIDGE_LOG_FORMAT` | `text` or `json` | `text` |
    /// | `TWILIO_ACCOUNT_SID` | Carrier account id | (none) |
    /// | `TWILIO_AUTH_TOKEN` | Carrier auth token | (none) |
    /// | `TWILIO_API_BASE` | Carrier REST base URL | `https://api.twilio.com` |
    /// | `INBOUND_WEBHOOK_URL` | Signed URL of the SMS webhook | request URL |
    /// | `STATUS_CALLBACK_URL` | Signed URL of the status webhook | (none) |
    /// | `BRIDGE_DEFAULT_COUNTRY_CODE` | Country code for bare numbers | `1` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = var("BRIDGE_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            var("SQLITE_PATH").unwrap_or_else(|| "sqlite:bridgechat.db?mode=rwc".to_string());

        let environment = match var("BRIDGE_ENV").as_deref() {
            None | Some("production") => Environment::Production,
            Some("development") => Environment::Development,
            Some(other) => return Err(ConfigError::InvalidEnvironment(other.to_string())),
        };

        let log_format = match var("BRIDGE_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let default_country_code =
            var("BRIDGE_DEFAULT_COUNTRY_CODE").unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());
        if !default_country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidCountryCode(default_country_code));
        }

        Ok(Self {
            addr,
            database_url,
            environment,
            log_format,
            account_sid: var("TWILIO_ACCOUNT_SID"),
            auth_token: var("TWILIO_AUTH_TOKEN").map(SecretString::from),
            api_base: var("TWILIO_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            inbound_webhook_url: var("INBOUND_WEBHOOK_URL"),
            status_callback_url: var("STATUS_CALLBACK_URL"),
            default_country_code,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BRIDGE_ADDR format")]
    InvalidAddr,

    #[error("BRIDGE_ENV must be production or development, got {0}")]
    InvalidEnvironment(String),

    #[error("BRIDGE_DEFAULT_COUNTRY_CODE must be digits, got {0}")]
    InvalidCountryCode(String),
}
