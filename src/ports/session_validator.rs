//! Identity token verification port.
//!
//! HTTP middleware hands the raw bearer token to a `SessionValidator` and
//! receives the verified caller. Implementations must check signature,
//! issuer, audience and expiry before trusting any claim.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Verifies identity tokens.
///
/// # Contract
///
/// - `AuthError::InvalidToken` for malformed or badly signed tokens
/// - `AuthError::TokenExpired` for otherwise valid tokens past `exp`
/// - `AuthError::ServiceUnavailable` when keys cannot be fetched
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a token (without the `Bearer ` prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
