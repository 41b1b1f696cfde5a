//! Application state shared across handlers.

use carrier_gateway::{CarrierClient, CarrierConfig};
use database::Database;
use relay::{GroupService, WebhookAuth};
use tracing::warn;

use crate::config::{Config, Environment};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Carrier client; `None` when credentials are not configured.
    pub carrier: Option<CarrierClient>,
    pub webhook_auth: WebhookAuth,
    pub groups: GroupService,
    pub inbound_webhook_url: Option<String>,
    pub status_callback_url: Option<String>,
    pub default_country_code: String,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(db: Database, config: &Config) -> Self {
        let carrier = match (&config.account_sid, &config.auth_token) {
            (Some(sid), Some(token)) => {
                let carrier_config = CarrierConfig {
                    api_base: config.api_base.trim_end_matches('/').to_string(),
                    account_sid: sid.clone(),
                    auth_token: token.clone(),
                    status_callback: config.status_callback_url.clone(),
                };
                match CarrierClient::new(carrier_config) {
                    Ok(client) => Some(client),
                    Err(e) => {
                        warn!("Carrier client unavailable: {}", e);
                        None
                    }
                }
            }
            _ => {
                warn!("Carrier credentials not configured; webhooks and dispatch will fail");
                None
            }
        };

        let mut webhook_auth = WebhookAuth::new(config.auth_token.clone());
        if config.environment == Environment::Development {
            warn!("Development environment: webhook signatures are not verified");
            webhook_auth = webhook_auth.insecure_skip_verification();
        }

        let groups =
            GroupService::new(db.clone()).with_default_country_code(config.default_country_code.clone());

        Self {
            db,
            carrier,
            webhook_auth,
            groups,
            inbound_webhook_url: config.inbound_webhook_url.clone(),
            status_callback_url: config.status_callback_url.clone(),
            default_country_code: config.default_country_code.clone(),
        }
    }
}
