//! The persisted subscription record, one per subscriber.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::{SubscriptionStatus, Tier};

/// Provider-hosted management links, passed through unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementUrls {
    #[serde(default)]
    pub customer_portal: String,
    #[serde(default)]
    pub update_payment_method: String,
    #[serde(default)]
    pub customer_portal_update_subscription: String,
}

impl ManagementUrls {
    pub fn is_empty(&self) -> bool {
        self.customer_portal.is_empty()
            && self.update_payment_method.is_empty()
            && self.customer_portal_update_subscription.is_empty()
    }
}

/// Subscription state for one user.
///
/// `created_at` is written once, on the first record for a user, and copied
/// forward by every later write. `tier` is always derived from `variant_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub user_id: UserId,
    pub tier: Tier,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub variant_id: i64,
    #[serde(rename = "sub_id", default)]
    pub subscription_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    #[serde(default)]
    pub urls: ManagementUrls,
}

/// Tier and status a reader should act on at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveState {
    pub tier: Tier,
    pub status: SubscriptionStatus,
}

impl SubscriptionRecord {
    /// True when `expires_at` is set and already in the past at `now`.
    pub fn is_lapsed_at(&self, now: &Timestamp) -> bool {
        self.expires_at
            .map(|expires| expires.is_before(now))
            .unwrap_or(false)
    }

    /// Read-time view: a lapsed record reads as free/expired regardless of
    /// what status was last written.
    pub fn effective_state_at(&self, now: &Timestamp) -> EffectiveState {
        if self.is_lapsed_at(now) {
            EffectiveState {
                tier: Tier::Free,
                status: SubscriptionStatus::Expired,
            }
        } else {
            EffectiveState {
                tier: self.tier,
                status: self.status.clone(),
            }
        }
    }

    /// Whether the record grants entitlement at `now`, with expiry applied.
    pub fn is_entitled_at(&self, now: &Timestamp) -> bool {
        self.effective_state_at(now).status.is_entitled()
    }

    /// Carries `created_at` forward from a previously stored record.
    pub fn inherit_created_at(&mut self, previous: Option<&SubscriptionRecord>) {
        if let Some(previous) = previous {
            self.created_at = previous.created_at;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SubscriptionStatus::Cancelled
    }

    /// Marks the record cancelled at `now`.
    pub fn cancel(&mut self, now: Timestamp) {
        self.status = SubscriptionStatus::Cancelled;
        self.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::subscription::PLUS_VARIANT_ID;

    pub fn plus_record(user_id: &str) -> SubscriptionRecord {
        let now = Timestamp::now();
        SubscriptionRecord {
            user_id: UserId::new(user_id).unwrap(),
            tier: Tier::Plus,
            status: SubscriptionStatus::Active,
            variant_id: PLUS_VARIANT_ID,
            subscription_id: "sub_1".to_string(),
            customer_id: "42".to_string(),
            email: format!("{}@example.com", user_id),
            created_at: now,
            updated_at: now,
            expires_at: None,
            urls: ManagementUrls {
                customer_portal: "https://portal.example/c".to_string(),
                update_payment_method: "https://portal.example/pm".to_string(),
                customer_portal_update_subscription: "https://portal.example/s".to_string(),
            },
        }
    }
}
