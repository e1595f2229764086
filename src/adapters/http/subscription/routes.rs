//! Route table for the subscription API.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_subscription, create_checkout, get_management_url, get_subscription, get_subscription_status,
    get_subscription_urls, get_tier, handle_webhook, AppState,
};

/// Routes that act on the authenticated caller.
///
/// - `POST /checkout`
/// - `GET /tier`
/// - `GET /subscription`
/// - `GET /subscription/urls`
/// - `POST /cancel-subscription`
pub fn caller_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/tier", get(get_tier))
        .route("/subscription", get(get_subscription))
        .route("/subscription/urls", get(get_subscription_urls))
        .route("/cancel-subscription", post(cancel_subscription))
}

/// Lookups addressed by user id in the path; no bearer token needed.
pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/subscription/status/:user_id", get(get_subscription_status))
        .route("/subscription/management/:user_id", get(get_management_url))
}

/// The provider's webhook target, authenticated by signature.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

/// All subscription routes, for mounting under `/api`.
pub fn subscription_router() -> Router<AppState> {
    Router::new()
        .merge(caller_routes())
        .merge(lookup_routes())
        .merge(webhook_routes())
}
