//! HTTP adapter - axum router, middleware, and subscription endpoints.

pub mod health;
pub mod middleware;
pub mod router;
pub mod subscription;

pub use router::build_router;
pub use subscription::AppState;
