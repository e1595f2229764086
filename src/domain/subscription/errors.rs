//! Errors returned by the subscription API operations.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | UnsupportedTier | 400 |
//! | AlreadySubscribed | 409 |
//! | NotFoundForUser | 404 |
//! | NotActive | 404 |
//! | MissingSubscriptionId | 404 |
//! | ManagementUrlMissing | 500 |
//! | IdentityLookup | 500 |
//! | CheckoutFailed | 500 |
//! | Persistence | 500 |

use crate::domain::foundation::{DomainError, UserId, ValidationError};

use super::{SubscriptionStatus, Tier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Request body failed validation.
    ValidationFailed { field: String, message: String },

    /// Checkout requested for a tier that is not sold.
    UnsupportedTier(String),

    /// Caller already holds an entitled subscription at this tier.
    AlreadySubscribed { tier: Tier },

    /// No record exists for this user.
    NotFoundForUser(UserId),

    /// Record exists but its status does not allow the operation.
    NotActive { status: SubscriptionStatus },

    /// Record was never backed by a provider subscription.
    MissingSubscriptionId,

    /// Provider did not supply a customer portal link.
    ManagementUrlMissing,

    /// Profile lookup at the identity provider failed.
    IdentityLookup(String),

    /// Payment provider rejected or failed the checkout.
    CheckoutFailed(String),

    /// Subscription store failure.
    Persistence(String),
}

impl SubscriptionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_tier(tier: impl Into<String>) -> Self {
        SubscriptionError::UnsupportedTier(tier.into())
    }

    pub fn not_found_for_user(user_id: UserId) -> Self {
        SubscriptionError::NotFoundForUser(user_id)
    }

    pub fn code(&self) -> &'static str {
        match self {
            SubscriptionError::ValidationFailed { .. } => "VALIDATION_FAILED",
            SubscriptionError::UnsupportedTier(_) => "UNSUPPORTED_TIER",
            SubscriptionError::AlreadySubscribed { .. } => "ALREADY_SUBSCRIBED",
            SubscriptionError::NotFoundForUser(_) => "SUBSCRIPTION_NOT_FOUND",
            SubscriptionError::NotActive { .. } => "SUBSCRIPTION_NOT_ACTIVE",
            SubscriptionError::MissingSubscriptionId => "SUBSCRIPTION_ID_MISSING",
            SubscriptionError::ManagementUrlMissing => "MANAGEMENT_URL_MISSING",
            SubscriptionError::IdentityLookup(_) => "IDENTITY_LOOKUP_FAILED",
            SubscriptionError::CheckoutFailed(_) => "CHECKOUT_FAILED",
            SubscriptionError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns a caller-facing error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::UnsupportedTier(tier) => {
                format!("Invalid tier '{}'. Must be 'plus' or 'pro'", tier)
            }
            SubscriptionError::AlreadySubscribed { tier } => {
                format!("User already has an active {} subscription", tier)
            }
            SubscriptionError::NotFoundForUser(user_id) => {
                format!("No subscription found for user: {}", user_id)
            }
            SubscriptionError::NotActive { status } => {
                format!("Subscription is not active (status: {})", status)
            }
            SubscriptionError::MissingSubscriptionId => "No subscription ID found".to_string(),
            SubscriptionError::ManagementUrlMissing => {
                "Management URL not available for this subscription".to_string()
            }
            SubscriptionError::IdentityLookup(_) => "Failed to get user information".to_string(),
            SubscriptionError::CheckoutFailed(_) => "Failed to create checkout".to_string(),
            SubscriptionError::Persistence(_) => "Failed to access subscription data".to_string(),
        }
    }

    /// Returns true if the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::Persistence(_)
                | SubscriptionError::IdentityLookup(_)
                | SubscriptionError::CheckoutFailed(_)
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        SubscriptionError::Persistence(err.to_string())
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::validation(err.field().to_string(), err.to_string())
    }
}
