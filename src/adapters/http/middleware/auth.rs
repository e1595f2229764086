//! Bearer-token authentication for axum.
//!
//! ```text
//! Request ─► auth_middleware ─► AuthenticatedUser in extensions
//!                                         │
//!                      handler ◄── RequireAuth reads it back
//! ```
//!
//! The middleware only rejects requests that carry a token it cannot accept.
//! A request without a token passes through untouched; routes that need an
//! identity say so with the [`RequireAuth`] extractor.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Middleware state: the token validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Returns the token from `Authorization: Bearer <token>`, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates bearer tokens and injects the resulting [`AuthenticatedUser`].
///
/// - invalid, expired, or unknown-subject token: 401
/// - identity service unavailable: 503
/// - no token: continue unauthenticated
pub async fn auth_middleware(State(validator): State<AuthState>, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_failure(&e),
    }
}

fn auth_failure(error: &AuthError) -> Response {
    let (status, code, message) = match error {
        AuthError::ServiceUnavailable(detail) => {
            tracing::error!(error = %detail, "Identity service unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_UNAVAILABLE",
                "Authentication service unavailable",
            )
        }
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Token expired"),
        AuthError::InvalidToken | AuthError::UserNotFound => {
            tracing::debug!(error = %error, "Token rejected");
            (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "Invalid authentication token")
        }
    };

    (status, Json(serde_json::json!({ "code": code, "message": message }))).into_response()
}

/// Extractor for routes that need a verified caller.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid token reached the handler.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "code": "UNAUTHENTICATED",
                    "message": "Authorization header required"
                })),
            )
                .into_response(),
        }
    }
}
