//! JSON request and response bodies for the subscription API.
//!
//! Timestamps are rendered as RFC3339 strings; optional fields are omitted
//! rather than sent as `null`, except where a `null` carries meaning.

use serde::{Deserialize, Serialize};

use crate::application::{CancelSubscriptionResult, CreateCheckoutResult, SubscriptionStatusView, TierView};
use crate::domain::subscription::{ManagementUrls, SubscriptionRecord, SubscriptionStatus, Tier};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutRequest {
    /// "plus" or "pro".
    pub tier: String,
    /// Overrides the tier's default variant when non-zero.
    #[serde(default)]
    pub variant_id: Option<i64>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub message: String,
}

impl From<CreateCheckoutResult> for CheckoutResponse {
    fn from(result: CreateCheckoutResult) -> Self {
        Self {
            message: format!("Checkout created for {} tier", result.tier),
            checkout_url: result.checkout_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TierResponse {
    pub tier: Tier,
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl From<TierView> for TierResponse {
    fn from(view: TierView) -> Self {
        Self {
            tier: view.tier,
            status: view.status,
            variant_id: view.variant_id,
            created_at: view.created_at.map(|t| t.to_rfc3339()),
            updated_at: view.updated_at.map(|t| t.to_rfc3339()),
            expires_at: view.expires_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Record as shown to its owner. Management links are served separately.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub user_id: String,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub variant_id: i64,
    pub sub_id: String,
    pub customer_id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl From<SubscriptionRecord> for SubscriptionView {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            user_id: record.user_id.to_string(),
            tier: record.tier,
            status: record.status,
            variant_id: record.variant_id,
            sub_id: record.subscription_id,
            customer_id: record.customer_id,
            email: record.email,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
            expires_at: record.expires_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub subscription: Option<SubscriptionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Option<SubscriptionRecord>> for SubscriptionResponse {
    fn from(record: Option<SubscriptionRecord>) -> Self {
        match record {
            Some(record) => Self {
                subscription: Some(record.into()),
                message: None,
            },
            None => Self {
                subscription: None,
                message: Some("No subscription found".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionUrlsResponse {
    pub urls: Option<ManagementUrls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Option<ManagementUrls>> for SubscriptionUrlsResponse {
    fn from(urls: Option<ManagementUrls>) -> Self {
        let message = urls.is_none().then(|| "No subscription found".to_string());
        Self { urls, message }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub message: String,
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
}

impl From<CancelSubscriptionResult> for CancelResponse {
    fn from(result: CancelSubscriptionResult) -> Self {
        let message = if result.already_cancelled {
            "Subscription already cancelled"
        } else {
            "Subscription cancelled successfully"
        };
        Self {
            message: message.to_string(),
            status: result.status,
            cancelled_at: result.cancelled_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStatusResponse {
    pub user_id: String,
    pub sub_id: String,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SubscriptionStatusView> for SubscriptionStatusResponse {
    fn from(view: SubscriptionStatusView) -> Self {
        Self {
            user_id: view.user_id.to_string(),
            sub_id: view.subscription_id,
            tier: view.tier,
            status: view.status,
            expires_at: view.expires_at.map(|t| t.to_rfc3339()),
            created_at: view.created_at.to_rfc3339(),
            updated_at: view.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagementUrlResponse {
    pub management_url: String,
}
