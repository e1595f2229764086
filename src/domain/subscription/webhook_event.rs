//! LemonSqueezy subscription webhook payloads.
//!
//! Only the fields the processor reads are captured; everything else in the
//! provider's JSON:API document is ignored. Every field is optional on the
//! wire and defaults to its zero value, so a sparse payload still parses and
//! is rejected later by the pipeline with a precise error instead of a
//! generic parse failure.

use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level webhook document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: WebhookMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: SubscriptionData,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_name: String,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
}

/// Free-form data the checkout attached to the subscription.
///
/// `user_id` is kept as a raw JSON value: a non-string identifier must not
/// fail the whole parse, it simply does not count as an identity.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomData {
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

impl CustomData {
    /// The `user_id` entry when it is a non-empty string.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id
            .as_ref()
            .and_then(|value| value.as_str())
            .filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionData {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    /// Provider subscription id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: SubscriptionAttributes,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub store_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variant_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: SubscriptionUrls,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionUrls {
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_portal: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_payment_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_portal_update_subscription: String,
}

impl WebhookPayload {
    /// Parses raw webhook bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    pub fn kind(&self) -> SubscriptionEventKind {
        SubscriptionEventKind::from_event_name(&self.meta.event_name)
    }
}

/// The subscription lifecycle events this service understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionEventKind {
    Created,
    Updated,
    Cancelled,
    PlanChanged,
    Resumed,
    Expired,
    Paused,
    Unpaused,
    /// Any other event name; acknowledged and ignored.
    Unknown(String),
}

impl SubscriptionEventKind {
    pub const KNOWN: [SubscriptionEventKind; 8] = [
        SubscriptionEventKind::Created,
        SubscriptionEventKind::Updated,
        SubscriptionEventKind::Cancelled,
        SubscriptionEventKind::PlanChanged,
        SubscriptionEventKind::Resumed,
        SubscriptionEventKind::Expired,
        SubscriptionEventKind::Paused,
        SubscriptionEventKind::Unpaused,
    ];

    pub fn from_event_name(name: &str) -> Self {
        match name {
            "subscription_created" => Self::Created,
            "subscription_updated" => Self::Updated,
            "subscription_cancelled" => Self::Cancelled,
            "subscription_plan_changed" => Self::PlanChanged,
            "subscription_resumed" => Self::Resumed,
            "subscription_expired" => Self::Expired,
            "subscription_paused" => Self::Paused,
            "subscription_unpaused" => Self::Unpaused,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "subscription_created",
            Self::Updated => "subscription_updated",
            Self::Cancelled => "subscription_cancelled",
            Self::PlanChanged => "subscription_plan_changed",
            Self::Resumed => "subscription_resumed",
            Self::Expired => "subscription_expired",
            Self::Paused => "subscription_paused",
            Self::Unpaused => "subscription_unpaused",
            Self::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

/// Builds webhook JSON bodies for tests.
#[cfg(test)]
pub(crate) struct WebhookPayloadBuilder {
    value: serde_json::Value,
}

#[cfg(test)]
impl WebhookPayloadBuilder {
    pub fn new(event_name: &str) -> Self {
        Self {
            value: serde_json::json!({
                "meta": { "event_name": event_name },
                "data": {
                    "type": "subscriptions",
                    "id": "sub_1",
                    "attributes": {
                        "store_id": 7,
                        "customer_id": 42,
                        "variant_id": super::PLUS_VARIANT_ID,
                        "user_email": "buyer@example.com",
                        "status": "active",
                        "ends_at": null,
                        "urls": {
                            "customer_portal": "https://portal.example/c",
                            "update_payment_method": "https://portal.example/pm",
                            "customer_portal_update_subscription": "https://portal.example/s"
                        }
                    }
                }
            }),
        }
    }

    pub fn meta_user(mut self, user_id: &str) -> Self {
        self.value["meta"]["custom_data"] = serde_json::json!({ "user_id": user_id });
        self
    }

    pub fn attribute_user(mut self, user_id: &str) -> Self {
        self.value["data"]["attributes"]["custom_data"] = serde_json::json!({ "user_id": user_id });
        self
    }

    pub fn attribute(mut self, key: &str, value: serde_json::Value) -> Self {
        self.value["data"]["attributes"][key] = value;
        self
    }

    pub fn subscription_id(mut self, id: &str) -> Self {
        self.value["data"]["id"] = serde_json::json!(id);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.value).unwrap()
    }

    pub fn build(&self) -> WebhookPayload {
        serde_json::from_value(self.value.clone()).unwrap()
    }
}
