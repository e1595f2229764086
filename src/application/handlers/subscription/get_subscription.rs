//! GetSubscriptionHandler - Query handler for the caller's full record.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{SubscriptionError, SubscriptionRecord};
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
}

/// Returns the stored record as-is; `None` when the caller never subscribed.
pub struct GetSubscriptionHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl GetSubscriptionHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetSubscriptionQuery) -> Result<Option<SubscriptionRecord>, SubscriptionError> {
        Ok(self.store.get(&query.user_id).await?)
    }
}
