//! Subscription store port.
//!
//! A key-value view of subscription records keyed by `user_id`. The store
//! has no merge semantics: `put` replaces the whole record, so callers
//! compose read-modify-write themselves (and serialize it per user).
//!
//! # Example
//!
//! ```ignore
//! let existing = store.get(&user_id).await?;
//! record.inherit_created_at(existing.as_ref());
//! store.put(&record).await?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::SubscriptionRecord;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Fetch the record for a user. A missing record is `Ok(None)`.
    async fn get(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Create or fully replace the record for `record.user_id`.
    async fn put(&self, record: &SubscriptionRecord) -> Result<(), DomainError>;

    /// Remove a user's record. Deleting a missing record succeeds.
    ///
    /// Administrative use only; no webhook path deletes.
    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError>;

    /// Up to `limit` records, most recently updated first where the backend
    /// can order them.
    async fn list(&self, limit: usize) -> Result<Vec<SubscriptionRecord>, DomainError>;
}
