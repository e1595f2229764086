//! GetTierHandler - Query handler for the caller's effective tier.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{SubscriptionError, SubscriptionStatus, Tier};
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone)]
pub struct GetTierQuery {
    pub user_id: UserId,
}

/// Tier view with the read-time expiry check applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierView {
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub variant_id: Option<i64>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
}

impl TierView {
    /// View for a user who never subscribed.
    pub fn free() -> Self {
        Self {
            tier: Tier::Free,
            status: SubscriptionStatus::Inactive,
            variant_id: None,
            created_at: None,
            updated_at: None,
            expires_at: None,
        }
    }
}

pub struct GetTierHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl GetTierHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetTierQuery) -> Result<TierView, SubscriptionError> {
        let Some(record) = self.store.get(&query.user_id).await? else {
            return Ok(TierView::free());
        };

        let state = record.effective_state_at(&Timestamp::now());
        Ok(TierView {
            tier: state.tier,
            status: state.status,
            variant_id: Some(record.variant_id),
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
            expires_at: record.expires_at,
        })
    }
}
