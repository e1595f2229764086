//! HTTP handlers for the subscription endpoints.
//!
//! Each handler builds its application handler from [`AppState`] on demand,
//! runs it, and maps the outcome to JSON.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::http::middleware::RequireAuth;
use crate::application::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CreateCheckoutCommand, CreateCheckoutHandler,
    GetManagementUrlHandler, GetManagementUrlQuery, GetSubscriptionHandler, GetSubscriptionQuery,
    GetSubscriptionStatusHandler, GetSubscriptionStatusQuery, GetSubscriptionUrlsHandler,
    GetSubscriptionUrlsQuery, GetTierHandler, GetTierQuery, ProcessWebhookCommand, ProcessWebhookHandler,
    ProcessWebhookResult, UserLocks,
};
use crate::domain::foundation::UserId;
use crate::domain::subscription::{ProcessingError, SignatureVerifier, SubscriptionError};
use crate::ports::{AuthProvider, CheckoutProvider, SessionValidator, SubscriptionStore};

use super::dto::{
    CancelResponse, CheckoutResponse, CreateCheckoutRequest, ErrorResponse, ManagementUrlResponse,
    MessageResponse, SubscriptionResponse, SubscriptionStatusResponse, SubscriptionUrlsResponse, TierResponse,
};

/// Header carrying the webhook HMAC.
pub const SIGNATURE_HEADER: &str = "X-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared dependencies, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubscriptionStore>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub checkout_provider: Arc<dyn CheckoutProvider>,
    pub verifier: SignatureVerifier,
    pub locks: Arc<UserLocks>,
}

impl AppState {
    pub fn process_webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(self.store.clone(), self.verifier.clone(), self.locks.clone())
    }

    pub fn create_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            self.store.clone(),
            self.auth_provider.clone(),
            self.checkout_provider.clone(),
        )
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.store.clone(), self.locks.clone())
    }

    pub fn get_tier_handler(&self) -> GetTierHandler {
        GetTierHandler::new(self.store.clone())
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.store.clone())
    }

    pub fn get_subscription_urls_handler(&self) -> GetSubscriptionUrlsHandler {
        GetSubscriptionUrlsHandler::new(self.store.clone())
    }

    pub fn get_subscription_status_handler(&self) -> GetSubscriptionStatusHandler {
        GetSubscriptionStatusHandler::new(self.store.clone())
    }

    pub fn get_management_url_handler(&self) -> GetManagementUrlHandler {
        GetManagementUrlHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Caller Endpoints (require authentication)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let cmd = CreateCheckoutCommand {
        user_id: user.id,
        tier: request.tier,
        variant_id: request.variant_id,
    };

    let result = state.create_checkout_handler().handle(cmd).await?;

    Ok(Json(CheckoutResponse::from(result)))
}

/// GET /api/tier
pub async fn get_tier(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let view = state.get_tier_handler().handle(GetTierQuery { user_id: user.id }).await?;
    Ok(Json(TierResponse::from(view)))
}

/// GET /api/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let record = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery { user_id: user.id })
        .await?;
    Ok(Json(SubscriptionResponse::from(record)))
}

/// GET /api/subscription/urls
pub async fn get_subscription_urls(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let urls = state
        .get_subscription_urls_handler()
        .handle(GetSubscriptionUrlsQuery { user_id: user.id })
        .await?;
    Ok(Json(SubscriptionUrlsResponse::from(urls)))
}

/// POST /api/cancel-subscription
pub async fn cancel_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let result = state
        .cancel_subscription_handler()
        .handle(CancelSubscriptionCommand { user_id: user.id })
        .await?;
    Ok(Json(CancelResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Lookup Endpoints (by path user id)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscription/status/:user_id
pub async fn get_subscription_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let user_id = UserId::new(user_id).map_err(SubscriptionError::from)?;
    let view = state
        .get_subscription_status_handler()
        .handle(GetSubscriptionStatusQuery { user_id })
        .await?;
    Ok(Json(SubscriptionStatusResponse::from(view)))
}

/// GET /api/subscription/management/:user_id
pub async fn get_management_url(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let user_id = UserId::new(user_id).map_err(SubscriptionError::from)?;
    let management_url = state
        .get_management_url_handler()
        .handle(GetManagementUrlQuery { user_id })
        .await?;
    Ok(Json(ManagementUrlResponse { management_url }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Endpoint (signature verified, no bearer auth)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhook
///
/// Takes the body as raw bytes; the signature is checked before any parsing.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let message = match state.process_webhook_handler().handle(cmd).await? {
        ProcessWebhookResult::Applied { .. } => "Webhook processed successfully",
        ProcessWebhookResult::Ignored { .. } => "Webhook event ignored",
    };

    Ok(Json(MessageResponse::new(message)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Maps [`SubscriptionError`] to a status code and `{code, message}` body.
#[derive(Debug)]
pub struct SubscriptionApiError(pub SubscriptionError);

impl From<SubscriptionError> for SubscriptionApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl SubscriptionApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            SubscriptionError::ValidationFailed { .. } | SubscriptionError::UnsupportedTier(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::AlreadySubscribed { .. } => StatusCode::CONFLICT,
            SubscriptionError::NotFoundForUser(_)
            | SubscriptionError::NotActive { .. }
            | SubscriptionError::MissingSubscriptionId => StatusCode::NOT_FOUND,
            SubscriptionError::ManagementUrlMissing
            | SubscriptionError::IdentityLookup(_)
            | SubscriptionError::CheckoutFailed(_)
            | SubscriptionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = ?self.0, "Subscription request failed");
        }
        let body = ErrorResponse::new(self.0.code(), self.0.message());
        (status, Json(body)).into_response()
    }
}

/// Maps [`ProcessingError`] so that only store failures invite redelivery.
#[derive(Debug)]
pub struct WebhookApiError(pub ProcessingError);

impl From<ProcessingError> for WebhookApiError {
    fn from(err: ProcessingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let message = match &self.0 {
            ProcessingError::Persistence(_) => "Failed to process webhook".to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse::new(self.0.code(), message);
        (self.0.status_code(), Json(body)).into_response()
    }
}
