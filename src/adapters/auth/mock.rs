//! In-process identity doubles.
//!
//! `MockSessionValidator` maps bearer tokens to users; `MockAuthProvider`
//! maps user ids to profiles. Both can be switched into a failure mode to
//! exercise 401/503/500 paths without a real identity service.
//!
//! ```ignore
//! let validator = MockSessionValidator::new()
//!     .with_test_user("token-u1", UserId::new("u1")?);
//! let profiles = MockAuthProvider::new()
//!     .with_test_user(UserId::new("u1")?);
//! ```

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{AuthProvider, SessionValidator};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn test_user(user_id: UserId) -> AuthenticatedUser {
    let email = format!("{}@test.example.com", user_id);
    AuthenticatedUser::new(user_id, email, None, true)
}

/// Token-to-user table. Unknown tokens are `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    failure: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Registers a user with a synthesized `<id>@test.example.com` email.
    pub fn with_test_user(self, token: impl Into<String>, user_id: UserId) -> Self {
        self.with_user(token, test_user(user_id))
    }

    /// Every validation fails with `error` until cleared.
    pub fn with_error(self, error: AuthError) -> Self {
        *write(&self.failure) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *write(&self.failure) = None;
    }

    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        write(&self.tokens).insert(token.into(), user);
    }

    pub fn remove_token(&self, token: &str) {
        write(&self.tokens).remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = read(&self.failure).clone() {
            return Err(error);
        }
        read(&self.tokens).get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}

/// Profile table. Unknown ids are `UserNotFound`.
#[derive(Debug, Default)]
pub struct MockAuthProvider {
    users: RwLock<HashMap<UserId, AuthenticatedUser>>,
    failure: RwLock<Option<AuthError>>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: AuthenticatedUser) -> Self {
        self.add_user(user);
        self
    }

    pub fn with_test_user(self, user_id: UserId) -> Self {
        self.with_user(test_user(user_id))
    }

    pub fn with_error(self, error: AuthError) -> Self {
        *write(&self.failure) = Some(error);
        self
    }

    pub fn add_user(&self, user: AuthenticatedUser) {
        write(&self.users).insert(user.id.clone(), user);
    }

    pub fn user_count(&self) -> usize {
        read(&self.users).len()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_user(&self, user_id: &UserId) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = read(&self.failure).clone() {
            return Err(error);
        }
        read(&self.users).get(user_id).cloned().ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // MockSessionValidator
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn validator_resolves_registered_token() {
        let validator = MockSessionValidator::new().with_test_user("tok", uid("u1"));

        let user = validator.validate("tok").await.unwrap();

        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.email, "u1@test.example.com");
    }

    #[tokio::test]
    async fn validator_rejects_unknown_token() {
        let validator = MockSessionValidator::new();
        assert_eq!(validator.validate("nope").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn validator_forced_error_until_cleared() {
        let validator = MockSessionValidator::new()
            .with_test_user("tok", uid("u1"))
            .with_error(AuthError::service_unavailable("down"));

        assert!(matches!(validator.validate("tok").await, Err(AuthError::ServiceUnavailable(_))));

        validator.clear_error();
        assert!(validator.validate("tok").await.is_ok());
    }

    #[tokio::test]
    async fn removed_token_is_invalid() {
        let validator = MockSessionValidator::new().with_test_user("tok", uid("u1"));
        validator.remove_token("tok");
        assert_eq!(validator.validate("tok").await, Err(AuthError::InvalidToken));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // MockAuthProvider
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn provider_returns_registered_profile() {
        let provider = MockAuthProvider::new().with_test_user(uid("u1"));

        let user = provider.get_user(&uid("u1")).await.unwrap();

        assert_eq!(user.email, "u1@test.example.com");
        assert_eq!(provider.user_count(), 1);
    }

    #[tokio::test]
    async fn provider_unknown_user_is_not_found() {
        let provider = MockAuthProvider::new();
        assert_eq!(provider.get_user(&uid("ghost")).await, Err(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn provider_forced_error() {
        let provider = MockAuthProvider::new()
            .with_test_user(uid("u1"))
            .with_error(AuthError::service_unavailable("quota"));

        assert!(provider.get_user(&uid("u1")).await.is_err());
    }
}
