//! Store doubles shared by the handler tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::adapters::store::InMemorySubscriptionStore;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::subscription::SubscriptionRecord;
use crate::ports::SubscriptionStore;

/// In-memory store that can be told to fail reads or writes.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemorySubscriptionStore,
    pub fail_get: bool,
    pub fail_put: bool,
    pub put_attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_get() -> Self {
        Self {
            fail_get: true,
            ..Default::default()
        }
    }

    pub fn failing_put(records: impl IntoIterator<Item = SubscriptionRecord>) -> Self {
        Self {
            inner: InMemorySubscriptionStore::with_records(records),
            fail_put: true,
            ..Default::default()
        }
    }

    pub fn put_attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionStore for FlakyStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>, DomainError> {
        if self.fail_get {
            return Err(DomainError::new(ErrorCode::CacheError, "Simulated read failure"));
        }
        self.inner.get(user_id).await
    }

    async fn put(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(DomainError::new(ErrorCode::CacheError, "Simulated write failure"));
        }
        self.inner.put(record).await
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        self.inner.delete(user_id).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<SubscriptionRecord>, DomainError> {
        self.inner.list(limit).await
    }
}

pub fn uid(raw: &str) -> UserId {
    UserId::new(raw).unwrap()
}
