//! SMS carrier client library.
//!
//! This crate talks to a Twilio-compatible carrier. It supports:
//!
//! - Sending outbound SMS through the REST API (basic auth, form body)
//! - Computing and checking webhook request signatures
//!
//! # Example
//!
//! ```no_run
//! use carrier_gateway::{CarrierClient, CarrierConfig, SendSms};
//!
//! # async fn example() -> Result<(), carrier_gateway::GatewayError> {
//! let config = CarrierConfig::new("AC123", "auth-token");
//! let client = CarrierClient::new(config)?;
//!
//! let sent = client
//!     .send_sms(&SendSms::new("+15550000001", "+15551234567", "Ana: hi"))
//!     .await?;
//! println!("carrier id {} ({})", sent.sid, sent.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod signature;
pub mod types;

pub use client::CarrierClient;
pub use config::CarrierConfig;
pub use error::GatewayError;
pub use signature::{compute_signature, validate_signature, SIGNATURE_HEADER};
pub use types::*;
