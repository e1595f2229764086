//! Identity types shared by the auth ports and HTTP middleware.
//!
//! `AuthenticatedUser` is what a verified identity token resolves to, and
//! doubles as the user profile returned by `AuthProvider::get_user`. Neither
//! type knows which identity provider produced it.

use super::UserId;
use thiserror::Error;

/// Verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Provider-issued subject (Firebase uid).
    pub id: UserId,

    /// Email address, empty when the provider has none on file.
    pub email: String,

    pub display_name: Option<String>,

    pub email_verified: bool,
}

impl AuthenticatedUser {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
        email_verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
            email_verified,
        }
    }

    /// True when the provider supplied an email address.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

/// Failures while verifying a token or looking up a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing, malformed, or badly signed token.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("User not found")]
    UserNotFound,

    /// Identity service unreachable or misconfigured.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if the caller should obtain a fresh token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> UserId {
        UserId::new("firebase-uid-1").unwrap()
    }

    #[test]
    fn has_email_is_false_for_blank_email() {
        let user = AuthenticatedUser::new(uid(), "  ", None, false);
        assert!(!user.has_email());
    }

    #[test]
    fn has_email_is_true_for_real_address() {
        let user = AuthenticatedUser::new(uid(), "a@b.io", None, true);
        assert!(user.has_email());
    }

    #[test]
    fn service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("JWKS fetch failed");
        assert_eq!(err.to_string(), "Auth service unavailable: JWKS fetch failed");
    }

    #[test]
    fn reauthentication_and_transience_are_disjoint() {
        for err in [
            AuthError::InvalidToken,
            AuthError::TokenExpired,
            AuthError::UserNotFound,
            AuthError::service_unavailable("x"),
        ] {
            assert_ne!(err.requires_reauthentication(), err.is_transient());
        }
    }
}
