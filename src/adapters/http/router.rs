//! Assembles the full HTTP application.
//!
//! ```text
//! request-id ─► trace ─► cors ─► compression ─► timeout ─► auth ─► routes
//! ```
//!
//! `/health` sits outside the timeout and auth layers.

use axum::http::{header, HeaderValue, Method};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;

use super::health::health_routes;
use super::middleware::auth_middleware;
use super::subscription::{subscription_router, AppState};

/// Builds the router with every middleware layer applied.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let api = subscription_router().layer(middleware::from_fn_with_state(
        state.session_validator.clone(),
        auth_middleware,
    ));

    let stack = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(server.request_timeout()));

    Router::new()
        .nest("/api", api)
        .layer(stack)
        .merge(health_routes())
        .with_state(state)
}

/// CORS for the configured origins. Unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
