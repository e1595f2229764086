//! In-memory subscription store.
//!
//! Process-local and lost on restart. Used for development, tests, and
//! single-instance deployments that accept that.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::SubscriptionRecord;
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    records: Arc<RwLock<HashMap<UserId, SubscriptionRecord>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with records, bypassing the write counter.
    pub fn with_records(records: impl IntoIterator<Item = SubscriptionRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.user_id.clone(), record))
            .collect();
        Self {
            records: Arc::new(RwLock::new(map)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `put` calls served so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn put(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        self.records
            .write()
            .await
            .insert(record.user_id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        self.records.write().await.remove(user_id);
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<SubscriptionRecord>, DomainError> {
        let mut records: Vec<SubscriptionRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        records.truncate(limit);
        Ok(records)
    }
}
