//! LemonSqueezy checkout client.
//!
//! # Configuration
//!
//! ```ignore
//! let config = LemonSqueezyConfig::from(&app_config.payment);
//! let adapter = LemonSqueezyCheckoutAdapter::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::ports::{CheckoutError, CheckoutProvider, CheckoutRequest, CheckoutSession};

const JSON_API: &str = "application/vnd.api+json";

const THANK_YOU_NOTE: &str = "Thank you for subscribing to Mayura AI!";

const BUTTON_COLOR: &str = "#7047EB";

/// LemonSqueezy API configuration.
#[derive(Clone)]
pub struct LemonSqueezyConfig {
    api_key: SecretString,
    store_id: String,
    api_base_url: String,
    redirect_url: String,
    receipt_url: String,
    test_mode: bool,
    timeout: Duration,
}

impl LemonSqueezyConfig {
    pub fn new(api_key: impl Into<String>, store_id: impl Into<String>) -> Self {
        let defaults = PaymentConfig::default();
        let timeout = defaults.http_timeout();
        Self {
            api_key: SecretString::new(api_key.into()),
            store_id: store_id.into(),
            api_base_url: defaults.api_base_url,
            redirect_url: defaults.redirect_url,
            receipt_url: defaults.receipt_url,
            test_mode: false,
            timeout,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    fn checkouts_url(&self) -> String {
        format!("{}/checkouts", self.api_base_url.trim_end_matches('/'))
    }
}

impl From<&PaymentConfig> for LemonSqueezyConfig {
    fn from(config: &PaymentConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            store_id: config.store_id.clone(),
            api_base_url: config.api_base_url.clone(),
            redirect_url: config.redirect_url.clone(),
            receipt_url: config.receipt_url.clone(),
            test_mode: config.test_mode,
            timeout: config.http_timeout(),
        }
    }
}

impl std::fmt::Debug for LemonSqueezyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemonSqueezyConfig")
            .field("store_id", &self.store_id)
            .field("api_base_url", &self.api_base_url)
            .field("test_mode", &self.test_mode)
            .finish_non_exhaustive()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct CheckoutBody {
    data: CheckoutResource,
}

#[derive(Debug, Serialize)]
struct CheckoutResource {
    #[serde(rename = "type")]
    resource_type: &'static str,
    attributes: CheckoutAttributes,
    relationships: CheckoutRelationships,
}

#[derive(Debug, Serialize)]
struct CheckoutAttributes {
    product_options: ProductOptions,
    checkout_options: CheckoutOptions,
    checkout_data: CheckoutData,
    test_mode: bool,
}

#[derive(Debug, Serialize)]
struct ProductOptions {
    enabled_variants: Vec<i64>,
    redirect_url: String,
    receipt_link_url: String,
    receipt_thank_you_note: &'static str,
}

#[derive(Debug, Serialize)]
struct CheckoutOptions {
    embed: bool,
    media: bool,
    logo: bool,
    desc: bool,
    discount: bool,
    dark: bool,
    subscription_preview: bool,
    button_color: &'static str,
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        Self {
            embed: false,
            media: true,
            logo: true,
            desc: true,
            discount: true,
            dark: false,
            subscription_preview: true,
            button_color: BUTTON_COLOR,
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckoutData {
    email: String,
    custom: CheckoutCustom,
}

#[derive(Debug, Serialize)]
struct CheckoutCustom {
    user_id: String,
}

#[derive(Debug, Serialize)]
struct CheckoutRelationships {
    store: Relationship,
    variant: Relationship,
}

#[derive(Debug, Serialize)]
struct Relationship {
    data: RelationshipItem,
}

#[derive(Debug, Serialize)]
struct RelationshipItem {
    #[serde(rename = "type")]
    resource_type: &'static str,
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    data: CheckoutResponseData,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponseData {
    attributes: CheckoutResponseAttributes,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponseAttributes {
    #[serde(default)]
    url: String,
}

fn checkout_body(config: &LemonSqueezyConfig, request: &CheckoutRequest) -> CheckoutBody {
    CheckoutBody {
        data: CheckoutResource {
            resource_type: "checkouts",
            attributes: CheckoutAttributes {
                product_options: ProductOptions {
                    enabled_variants: vec![request.variant_id],
                    redirect_url: config.redirect_url.clone(),
                    receipt_link_url: config.receipt_url.clone(),
                    receipt_thank_you_note: THANK_YOU_NOTE,
                },
                checkout_options: CheckoutOptions::default(),
                checkout_data: CheckoutData {
                    email: request.email.clone(),
                    custom: CheckoutCustom {
                        user_id: request.user_id.to_string(),
                    },
                },
                test_mode: config.test_mode,
            },
            relationships: CheckoutRelationships {
                store: Relationship {
                    data: RelationshipItem {
                        resource_type: "stores",
                        id: config.store_id.clone(),
                    },
                },
                variant: Relationship {
                    data: RelationshipItem {
                        resource_type: "variants",
                        id: request.variant_id.to_string(),
                    },
                },
            },
        },
    }
}

fn checkout_url_from(body: &[u8]) -> Result<String, CheckoutError> {
    let parsed: CheckoutResponse = serde_json::from_slice(body)
        .map_err(|e| CheckoutError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let url = parsed.data.attributes.url;
    if url.is_empty() {
        return Err(CheckoutError::InvalidResponse("Checkout URL missing".to_string()));
    }
    Ok(url)
}

// ════════════════════════════════════════════════════════════════════════════════
// Adapter
// ════════════════════════════════════════════════════════════════════════════════

/// LemonSqueezy checkout adapter.
pub struct LemonSqueezyCheckoutAdapter {
    config: LemonSqueezyConfig,
    http_client: reqwest::Client,
}

impl LemonSqueezyCheckoutAdapter {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: LemonSqueezyConfig) -> Result<Self, CheckoutError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckoutError::Configuration(e.to_string()))?;

        Ok(Self { config, http_client })
    }
}

#[async_trait]
impl CheckoutProvider for LemonSqueezyCheckoutAdapter {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        let body = checkout_body(&self.config, request);

        tracing::debug!(
            user_id = %request.user_id,
            variant_id = request.variant_id,
            test_mode = self.config.test_mode,
            "Creating checkout"
        );

        let response = self
            .http_client
            .post(self.config.checkouts_url())
            .header(ACCEPT, JSON_API)
            .header(CONTENT_TYPE, JSON_API)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        if status != StatusCode::CREATED {
            tracing::warn!(status = status.as_u16(), "Checkout rejected by provider");
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let checkout_url = checkout_url_from(&bytes)?;
        tracing::info!(user_id = %request.user_id, "Checkout created");

        Ok(CheckoutSession { checkout_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::subscription::PRO_VARIANT_ID;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            variant_id: PRO_VARIANT_ID,
            user_id: UserId::new("firebase-uid").unwrap(),
            email: "buyer@example.com".to_string(),
        }
    }

    fn body_json(config: &LemonSqueezyConfig) -> serde_json::Value {
        serde_json::to_value(checkout_body(config, &request())).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Request Body
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn body_is_a_checkouts_resource() {
        let json = body_json(&LemonSqueezyConfig::new("key", "store-1"));
        assert_eq!(json["data"]["type"], "checkouts");
    }

    #[test]
    fn user_id_travels_in_custom_data() {
        let json = body_json(&LemonSqueezyConfig::new("key", "store-1"));
        let checkout_data = &json["data"]["attributes"]["checkout_data"];

        assert_eq!(checkout_data["email"], "buyer@example.com");
        assert_eq!(checkout_data["custom"]["user_id"], "firebase-uid");
    }

    #[test]
    fn relationships_name_store_and_variant() {
        let json = body_json(&LemonSqueezyConfig::new("key", "store-1"));
        let relationships = &json["data"]["relationships"];

        assert_eq!(relationships["store"]["data"]["type"], "stores");
        assert_eq!(relationships["store"]["data"]["id"], "store-1");
        assert_eq!(relationships["variant"]["data"]["type"], "variants");
        assert_eq!(relationships["variant"]["data"]["id"], PRO_VARIANT_ID.to_string());
    }

    #[test]
    fn product_options_enable_only_requested_variant() {
        let json = body_json(&LemonSqueezyConfig::new("key", "store-1"));
        let options = &json["data"]["attributes"]["product_options"];

        assert_eq!(options["enabled_variants"], serde_json::json!([PRO_VARIANT_ID]));
        assert_eq!(options["redirect_url"], "https://mayura.rocks/dashboard");
        assert_eq!(options["receipt_link_url"], "https://mayura.rocks/receipt");
    }

    #[test]
    fn checkout_options_match_storefront_styling() {
        let json = body_json(&LemonSqueezyConfig::new("key", "store-1"));
        let options = &json["data"]["attributes"]["checkout_options"];

        assert_eq!(
            *options,
            serde_json::json!({
                "embed": false,
                "media": true,
                "logo": true,
                "desc": true,
                "discount": true,
                "dark": false,
                "subscription_preview": true,
                "button_color": "#7047EB"
            })
        );
    }

    #[test]
    fn test_mode_flag_is_forwarded() {
        let config = LemonSqueezyConfig::new("key", "store-1").with_test_mode(true);
        assert_eq!(body_json(&config)["data"]["attributes"]["test_mode"], true);
    }

    // ══════════════════════════════════════════════════════════════
    // Response Parsing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn reads_url_from_data_attributes() {
        let body = br#"{"data":{"type":"checkouts","id":"c1","attributes":{"url":"https://shop.example/checkout/c1"}}}"#;
        assert_eq!(checkout_url_from(body).unwrap(), "https://shop.example/checkout/c1");
    }

    #[test]
    fn empty_url_is_invalid_response() {
        let body = br#"{"data":{"attributes":{"url":""}}}"#;
        assert!(matches!(checkout_url_from(body), Err(CheckoutError::InvalidResponse(_))));
    }

    #[test]
    fn unparseable_body_is_invalid_response() {
        assert!(matches!(checkout_url_from(b"<html>"), Err(CheckoutError::InvalidResponse(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Configuration
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn checkouts_url_tolerates_trailing_slash() {
        let config = LemonSqueezyConfig::new("key", "s").with_base_url("http://localhost:9999/v1/");
        assert_eq!(config.checkouts_url(), "http://localhost:9999/v1/checkouts");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = LemonSqueezyConfig::new("very-secret-key", "s");
        assert!(!format!("{:?}", config).contains("very-secret-key"));
    }

    #[test]
    fn config_from_payment_section() {
        let payment = PaymentConfig {
            api_key: SecretString::new("k".to_string()),
            store_id: "42".to_string(),
            test_mode: true,
            ..Default::default()
        };
        let config = LemonSqueezyConfig::from(&payment);
        assert_eq!(config.store_id, "42");
        assert!(config.test_mode);
    }

    #[test]
    fn new_config_takes_payment_defaults() {
        let defaults = PaymentConfig::default();
        let config = LemonSqueezyConfig::new("k", "s");

        assert_eq!(config.timeout, defaults.http_timeout());
        assert_eq!(config.api_base_url, defaults.api_base_url);
        assert_eq!(config.receipt_url, defaults.receipt_url);
        assert!(!config.test_mode);
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_error() {
        let config = LemonSqueezyConfig::new("key", "s").with_base_url("http://127.0.0.1:1");
        let adapter = LemonSqueezyCheckoutAdapter::new(config).unwrap();

        let result = adapter.create_checkout(&request()).await;

        assert!(matches!(result, Err(CheckoutError::Network(_))));
    }
}
