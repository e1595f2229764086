//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates the subscription domain against its ports. Commands write
//! (webhook processing, checkout, cancellation); queries read.

pub mod handlers;
mod user_locks;

pub use user_locks::{UserLockGuard, UserLocks};

pub use handlers::subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    CreateCheckoutCommand, CreateCheckoutHandler, CreateCheckoutResult,
    GetManagementUrlHandler, GetManagementUrlQuery,
    GetSubscriptionHandler, GetSubscriptionQuery,
    GetSubscriptionStatusHandler, GetSubscriptionStatusQuery, SubscriptionStatusView,
    GetSubscriptionUrlsHandler, GetSubscriptionUrlsQuery,
    GetTierHandler, GetTierQuery, TierView,
    ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult,
};
