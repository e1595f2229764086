//! Errors raised while handling a subscription webhook delivery.
//!
//! The status code decides whether the provider redelivers: 4xx responses
//! are final, 5xx responses are retried by the provider.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// Signature header missing or not matching the body digest.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body is not a webhook document.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Neither custom-data location carried a user id.
    #[error("Missing subscriber identity")]
    MissingSubscriberIdentity,

    /// Variant does not belong to a paid tier.
    #[error("Unrecognized variant: {0}")]
    UnrecognizedVariant(i64),

    /// Subscription store read or write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ProcessingError {
    /// Returns true if the provider should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProcessingError::Persistence(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProcessingError::InvalidSignature => StatusCode::UNAUTHORIZED,
            ProcessingError::MalformedPayload(_)
            | ProcessingError::MissingSubscriberIdentity
            | ProcessingError::UnrecognizedVariant(_) => StatusCode::BAD_REQUEST,
            ProcessingError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProcessingError::InvalidSignature => "INVALID_SIGNATURE",
            ProcessingError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            ProcessingError::MissingSubscriberIdentity => "MISSING_SUBSCRIBER_IDENTITY",
            ProcessingError::UnrecognizedVariant(_) => "UNRECOGNIZED_VARIANT",
            ProcessingError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl From<DomainError> for ProcessingError {
    fn from(err: DomainError) -> Self {
        ProcessingError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for ProcessingError {
    fn from(err: serde_json::Error) -> Self {
        ProcessingError::MalformedPayload(err.to_string())
    }
}
