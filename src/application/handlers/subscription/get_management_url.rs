//! GetManagementUrlHandler - Query handler for a subscriber's portal link.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{SubscriptionError, SubscriptionStatus};
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone)]
pub struct GetManagementUrlQuery {
    pub user_id: UserId,
}

/// Resolves the customer portal link of an active subscription.
///
/// Only `active` qualifies; trialing and past-due subscribers are entitled
/// but are not offered the portal through this lookup.
pub struct GetManagementUrlHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl GetManagementUrlHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetManagementUrlQuery) -> Result<String, SubscriptionError> {
        let record = self
            .store
            .get(&query.user_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found_for_user(query.user_id.clone()))?;

        if record.status != SubscriptionStatus::Active {
            return Err(SubscriptionError::NotActive { status: record.status });
        }
        if record.subscription_id.is_empty() {
            return Err(SubscriptionError::MissingSubscriptionId);
        }
        if record.urls.customer_portal.is_empty() {
            tracing::warn!(user_id = %query.user_id, "Active subscription has no customer portal link");
            return Err(SubscriptionError::ManagementUrlMissing);
        }

        Ok(record.urls.customer_portal)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::uid;
    use super::*;
    use crate::adapters::store::InMemorySubscriptionStore;
    use crate::domain::subscription::{test_support::plus_record, SubscriptionRecord};

    async fn lookup(record: Option<SubscriptionRecord>) -> Result<String, SubscriptionError> {
        let store = InMemorySubscriptionStore::with_records(record);
        GetManagementUrlHandler::new(Arc::new(store))
            .handle(GetManagementUrlQuery { user_id: uid("u1") })
            .await
    }

    #[tokio::test]
    async fn active_subscription_returns_portal() {
        assert_eq!(lookup(Some(plus_record("u1"))).await.unwrap(), "https://portal.example/c");
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        assert_eq!(lookup(None).await.unwrap_err(), SubscriptionError::NotFoundForUser(uid("u1")));
    }

    #[tokio::test]
    async fn non_active_status_is_rejected() {
        let mut record = plus_record("u1");
        record.status = SubscriptionStatus::PastDue;

        assert_eq!(
            lookup(Some(record)).await.unwrap_err(),
            SubscriptionError::NotActive { status: SubscriptionStatus::PastDue }
        );
    }

    #[tokio::test]
    async fn empty_subscription_id_is_rejected() {
        let mut record = plus_record("u1");
        record.subscription_id.clear();

        assert_eq!(lookup(Some(record)).await.unwrap_err(), SubscriptionError::MissingSubscriptionId);
    }

    #[tokio::test]
    async fn empty_portal_link_is_reported() {
        let mut record = plus_record("u1");
        record.urls.customer_portal.clear();

        assert_eq!(lookup(Some(record)).await.unwrap_err(), SubscriptionError::ManagementUrlMissing);
    }
}
