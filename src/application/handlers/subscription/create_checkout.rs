//! CreateCheckoutHandler - Command handler for starting a paid subscription.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{SubscriptionError, Tier};
use crate::ports::{AuthProvider, CheckoutProvider, CheckoutRequest, SubscriptionStore};

/// Command to create a hosted checkout for the caller.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub user_id: UserId,
    /// Requested tier name as sent by the client.
    pub tier: String,
    /// Explicit variant; absent or zero means "derive from tier".
    pub variant_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutResult {
    pub checkout_url: String,
    pub tier: Tier,
    pub variant_id: i64,
}

/// Handler for checkout creation.
///
/// Refuses a second checkout for a tier the caller is already entitled to;
/// switching tiers is allowed.
pub struct CreateCheckoutHandler {
    store: Arc<dyn SubscriptionStore>,
    auth_provider: Arc<dyn AuthProvider>,
    checkout_provider: Arc<dyn CheckoutProvider>,
}

impl CreateCheckoutHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        auth_provider: Arc<dyn AuthProvider>,
        checkout_provider: Arc<dyn CheckoutProvider>,
    ) -> Self {
        Self {
            store,
            auth_provider,
            checkout_provider,
        }
    }

    pub async fn handle(&self, cmd: CreateCheckoutCommand) -> Result<CreateCheckoutResult, SubscriptionError> {
        // 1. Only paid tiers are sold
        let tier = Tier::parse(&cmd.tier)
            .filter(Tier::is_paid)
            .ok_or_else(|| SubscriptionError::unsupported_tier(&cmd.tier))?;

        let variant_id = cmd
            .variant_id
            .filter(|id| *id != 0)
            .or_else(|| tier.variant_id())
            .ok_or_else(|| SubscriptionError::unsupported_tier(&cmd.tier))?;

        // 2. Same tier, still entitled: nothing to buy
        if let Some(existing) = self.store.get(&cmd.user_id).await? {
            if existing.tier == tier && existing.is_entitled_at(&Timestamp::now()) {
                tracing::info!(user_id = %cmd.user_id, tier = tier.as_str(), "Checkout refused, already subscribed");
                return Err(SubscriptionError::AlreadySubscribed { tier });
            }
        }

        // 3. Buyer email from the identity provider
        let profile = self.auth_provider.get_user(&cmd.user_id).await.map_err(|e| {
            tracing::error!(user_id = %cmd.user_id, error = %e, "Failed to load user profile");
            SubscriptionError::IdentityLookup(e.to_string())
        })?;

        // 4. Hosted checkout
        let request = CheckoutRequest {
            variant_id,
            user_id: cmd.user_id.clone(),
            email: profile.email,
        };
        let session = self.checkout_provider.create_checkout(&request).await.map_err(|e| {
            tracing::error!(user_id = %cmd.user_id, error = %e, "Checkout creation failed");
            SubscriptionError::CheckoutFailed(e.to_string())
        })?;

        Ok(CreateCheckoutResult {
            checkout_url: session.checkout_url,
            tier,
            variant_id,
        })
    }
}
