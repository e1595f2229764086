//! GetSubscriptionUrlsHandler - Query handler for provider management links.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{ManagementUrls, SubscriptionError};
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone)]
pub struct GetSubscriptionUrlsQuery {
    pub user_id: UserId,
}

pub struct GetSubscriptionUrlsHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl GetSubscriptionUrlsHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetSubscriptionUrlsQuery) -> Result<Option<ManagementUrls>, SubscriptionError> {
        let record = self.store.get(&query.user_id).await?;
        Ok(record.map(|r| r.urls))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::uid;
    use super::*;
    use crate::adapters::store::InMemorySubscriptionStore;
    use crate::domain::subscription::test_support::plus_record;

    #[tokio::test]
    async fn returns_urls_unmodified() {
        let record = plus_record("u1");
        let handler =
            GetSubscriptionUrlsHandler::new(Arc::new(InMemorySubscriptionStore::with_records([record.clone()])));

        let urls = handler.handle(GetSubscriptionUrlsQuery { user_id: uid("u1") }).await.unwrap();

        assert_eq!(urls, Some(record.urls));
    }

    #[tokio::test]
    async fn unknown_user_has_no_urls() {
        let handler = GetSubscriptionUrlsHandler::new(Arc::new(InMemorySubscriptionStore::new()));

        let urls = handler.handle(GetSubscriptionUrlsQuery { user_id: uid("u1") }).await.unwrap();

        assert!(urls.is_none());
    }
}
