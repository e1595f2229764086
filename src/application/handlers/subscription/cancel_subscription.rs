//! CancelSubscriptionHandler - Command handler for caller-initiated cancellation.
//!
//! Marks the local record cancelled. The provider-side subscription is left
//! alone; its own `subscription_cancelled` webhook arrives separately and
//! lands on the same state.

use std::sync::Arc;

use crate::application::UserLocks;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{SubscriptionError, SubscriptionStatus};
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelSubscriptionResult {
    pub status: SubscriptionStatus,
    /// True when the record was already cancelled and nothing was written.
    pub already_cancelled: bool,
    /// Time of this cancellation; `None` when nothing was written.
    pub cancelled_at: Option<Timestamp>,
}

pub struct CancelSubscriptionHandler {
    store: Arc<dyn SubscriptionStore>,
    locks: Arc<UserLocks>,
}

impl CancelSubscriptionHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, locks: Arc<UserLocks>) -> Self {
        Self { store, locks }
    }

    pub async fn handle(&self, cmd: CancelSubscriptionCommand) -> Result<CancelSubscriptionResult, SubscriptionError> {
        let _guard = self.locks.lock(&cmd.user_id).await;

        let mut record = self
            .store
            .get(&cmd.user_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found_for_user(cmd.user_id.clone()))?;

        if record.is_cancelled() {
            return Ok(CancelSubscriptionResult {
                status: SubscriptionStatus::Cancelled,
                already_cancelled: true,
                cancelled_at: None,
            });
        }

        let now = Timestamp::now();
        record.cancel(now);
        self.store.put(&record).await.map_err(|e| {
            tracing::error!(user_id = %cmd.user_id, error = %e, "Failed to persist cancellation");
            SubscriptionError::from(e)
        })?;

        tracing::info!(user_id = %cmd.user_id, subscription_id = %record.subscription_id, "Subscription cancelled");

        Ok(CancelSubscriptionResult {
            status: record.status,
            already_cancelled: false,
            cancelled_at: Some(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{uid, FlakyStore};
    use super::*;
    use crate::adapters::store::InMemorySubscriptionStore;
    use crate::domain::subscription::test_support::plus_record;

    fn handler(store: Arc<dyn SubscriptionStore>) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(store, Arc::new(UserLocks::new()))
    }

    fn cmd() -> CancelSubscriptionCommand {
        CancelSubscriptionCommand { user_id: uid("u1") }
    }

    #[tokio::test]
    async fn active_subscription_is_cancelled_and_persisted() {
        let original = plus_record("u1");
        let store = InMemorySubscriptionStore::with_records([original.clone()]);

        let result = handler(Arc::new(store.clone())).handle(cmd()).await.unwrap();

        assert!(!result.already_cancelled);
        assert_eq!(result.status, SubscriptionStatus::Cancelled);
        let stored = store.get(&uid("u1")).await.unwrap().unwrap();
        assert!(stored.is_cancelled());
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(Some(stored.updated_at), result.cancelled_at);
    }

    #[tokio::test]
    async fn already_cancelled_writes_nothing() {
        let mut record = plus_record("u1");
        record.status = SubscriptionStatus::Cancelled;
        let store = InMemorySubscriptionStore::with_records([record]);
        let writes_before = store.write_count();

        let result = handler(Arc::new(store.clone())).handle(cmd()).await.unwrap();

        assert!(result.already_cancelled);
        assert!(result.cancelled_at.is_none());
        assert_eq!(store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let err = handler(Arc::new(InMemorySubscriptionStore::new()))
            .handle(cmd())
            .await
            .unwrap_err();

        assert_eq!(err, SubscriptionError::NotFoundForUser(uid("u1")));
    }

    #[tokio::test]
    async fn write_failure_is_persistence_error() {
        let store = Arc::new(FlakyStore::failing_put([plus_record("u1")]));

        let err = handler(store.clone()).handle(cmd()).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::Persistence(_)));
        assert_eq!(store.put_attempts(), 1);
    }
}
