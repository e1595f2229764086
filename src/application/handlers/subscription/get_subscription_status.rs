//! GetSubscriptionStatusHandler - Query handler for service-to-service status lookups.
//!
//! Unlike [`super::GetTierHandler`], a missing record is an error here.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{SubscriptionError, SubscriptionStatus, Tier};
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone)]
pub struct GetSubscriptionStatusQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStatusView {
    pub user_id: UserId,
    pub subscription_id: String,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct GetSubscriptionStatusHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl GetSubscriptionStatusHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetSubscriptionStatusQuery) -> Result<SubscriptionStatusView, SubscriptionError> {
        let record = self
            .store
            .get(&query.user_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found_for_user(query.user_id.clone()))?;

        let state = record.effective_state_at(&Timestamp::now());
        Ok(SubscriptionStatusView {
            user_id: record.user_id,
            subscription_id: record.subscription_id,
            tier: state.tier,
            status: state.status,
            expires_at: record.expires_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::uid;
    use super::*;
    use crate::adapters::store::InMemorySubscriptionStore;
    use crate::domain::subscription::test_support::plus_record;

    #[tokio::test]
    async fn reports_stored_state() {
        let handler = GetSubscriptionStatusHandler::new(Arc::new(InMemorySubscriptionStore::with_records([
            plus_record("u1"),
        ])));

        let view = handler.handle(GetSubscriptionStatusQuery { user_id: uid("u1") }).await.unwrap();

        assert_eq!(view.subscription_id, "sub_1");
        assert_eq!(view.tier, Tier::Plus);
        assert_eq!(view.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn applies_expiry_at_read_time() {
        let mut record = plus_record("u1");
        record.expires_at = Some(Timestamp::now().minus_secs(1));
        let handler = GetSubscriptionStatusHandler::new(Arc::new(InMemorySubscriptionStore::with_records([record])));

        let view = handler.handle(GetSubscriptionStatusQuery { user_id: uid("u1") }).await.unwrap();

        assert_eq!(view.tier, Tier::Free);
        assert_eq!(view.status, SubscriptionStatus::Expired);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let handler = GetSubscriptionStatusHandler::new(Arc::new(InMemorySubscriptionStore::new()));

        let err = handler.handle(GetSubscriptionStatusQuery { user_id: uid("u9") }).await.unwrap_err();

        assert_eq!(err, SubscriptionError::NotFoundForUser(uid("u9")));
    }
}
