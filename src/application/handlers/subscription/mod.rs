//! Subscription command and query handlers.

mod cancel_subscription;
mod create_checkout;
mod get_management_url;
mod get_subscription;
mod get_subscription_status;
mod get_subscription_urls;
mod get_tier;
mod process_webhook;

#[cfg(test)]
mod test_support;

pub use cancel_subscription::{CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult};
pub use create_checkout::{CreateCheckoutCommand, CreateCheckoutHandler, CreateCheckoutResult};
pub use get_management_url::{GetManagementUrlHandler, GetManagementUrlQuery};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery};
pub use get_subscription_status::{GetSubscriptionStatusHandler, GetSubscriptionStatusQuery, SubscriptionStatusView};
pub use get_subscription_urls::{GetSubscriptionUrlsHandler, GetSubscriptionUrlsQuery};
pub use get_tier::{GetTierHandler, GetTierQuery, TierView};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult};
