//! User profile lookup port.
//!
//! Checkout needs the buyer's email on file at the identity provider, which
//! may differ from (or be missing in) the token the caller presented.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};

/// Looks up user profiles by id.
///
/// Returns `AuthError::UserNotFound` for unknown ids and
/// `AuthError::ServiceUnavailable` for transient failures.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_user(&self, user_id: &UserId) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct EmptyDirectory;

    #[async_trait]
    impl AuthProvider for EmptyDirectory {
        async fn get_user(&self, _user_id: &UserId) -> Result<AuthenticatedUser, AuthError> {
            Err(AuthError::UserNotFound)
        }
    }

    #[tokio::test]
    async fn provider_is_object_safe() {
        let provider: Arc<dyn AuthProvider> = Arc::new(EmptyDirectory);
        let result = provider.get_user(&UserId::new("nobody").unwrap()).await;
        assert_eq!(result, Err(AuthError::UserNotFound));
    }
}
