//! Liveness endpoint.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::domain::foundation::Timestamp;

pub const SERVICE_NAME: &str = "payment";

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: Timestamp::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn health_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_healthy_payment_service() {
        let Json(body) = health().await;

        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "payment");
        assert!(Timestamp::parse_rfc3339(&body.timestamp).is_some());
    }
}
