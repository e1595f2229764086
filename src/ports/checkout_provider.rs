//! Checkout creation port.
//!
//! Creates a hosted checkout at the payment provider for one variant. The
//! buyer's user id travels inside the checkout's custom data so that the
//! resulting subscription webhooks can be attributed back to the user.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub variant_id: i64,
    pub user_id: UserId,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub checkout_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Provider answered with an unexpected status.
    #[error("Payment provider returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Provider answered but the body was unusable.
    #[error("Invalid checkout response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Checkout client misconfigured: {0}")]
    Configuration(String),
}

impl CheckoutError {
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Network(_) => true,
            CheckoutError::Api { status, .. } => *status >= 500 || *status == 429,
            CheckoutError::InvalidResponse(_) | CheckoutError::Configuration(_) => false,
        }
    }
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError>;
}
