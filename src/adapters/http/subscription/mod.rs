//! HTTP adapter for the subscription API.
//!
//! - `POST /api/checkout` - start a hosted checkout
//! - `GET /api/tier` - caller's effective tier
//! - `GET /api/subscription` - caller's record
//! - `GET /api/subscription/urls` - caller's management links
//! - `POST /api/cancel-subscription` - mark the caller's subscription cancelled
//! - `GET /api/subscription/status/:user_id` - status lookup by id
//! - `GET /api/subscription/management/:user_id` - portal link by id
//! - `POST /api/webhook` - provider webhook receiver

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AppState, SubscriptionApiError, WebhookApiError, SIGNATURE_HEADER};
pub use routes::subscription_router;
