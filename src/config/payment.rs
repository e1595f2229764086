//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment configuration (LemonSqueezy)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// LemonSqueezy API key
    pub api_key: SecretString,

    /// Store that owns the subscription products
    pub store_id: String,

    /// Webhook signing secret; see `server.deployment_mode` for the unset case
    pub webhook_secret: Option<SecretString>,

    /// Where the buyer lands after checkout
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,

    /// Receipt link shown after purchase
    #[serde(default = "default_receipt_url")]
    pub receipt_url: String,

    #[serde(default)]
    pub test_mode: bool,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// True when a non-empty webhook secret is configured.
    pub fn has_webhook_secret(&self) -> bool {
        self.webhook_secret
            .as_ref()
            .map(|s| !s.expose_secret().is_empty())
            .unwrap_or(false)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_API_KEY"));
        }
        if self.store_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_STORE_ID"));
        }
        if self.api_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_API_BASE_URL"));
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::new(String::new()),
            store_id: String::new(),
            webhook_secret: None,
            redirect_url: default_redirect_url(),
            receipt_url: default_receipt_url(),
            test_mode: false,
            api_base_url: default_api_base_url(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_redirect_url() -> String {
    "https://mayura.rocks/dashboard".to_string()
}

fn default_receipt_url() -> String {
    "https://mayura.rocks/receipt".to_string()
}

fn default_api_base_url() -> String {
    "https://api.lemonsqueezy.com/v1".to_string()
}

fn default_http_timeout() -> u64 {
    30
}
