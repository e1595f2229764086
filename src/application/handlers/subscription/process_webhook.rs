//! ProcessWebhookHandler - Command handler for subscription webhooks.
//!
//! ```text
//! verify(raw) ─► parse ─► prepare_event ─► [lock user] get ─► merge ─► put
//! ```
//!
//! Everything up to `prepare_event` is pure; a rejection there never touches
//! the store.

use std::sync::Arc;

use crate::application::UserLocks;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{
    prepare_event, PreparedEvent, ProcessingError, SignatureVerifier, SubscriptionEventKind,
    SubscriptionRecord, WebhookPayload,
};
use crate::ports::SubscriptionStore;

/// Command carrying one webhook delivery exactly as received.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body; the signature covers these bytes.
    pub payload: Vec<u8>,
    /// Signature header value, empty when the header was absent.
    pub signature: String,
}

/// Outcome of a delivery that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessWebhookResult {
    /// The record was written.
    Applied {
        event: SubscriptionEventKind,
        record: SubscriptionRecord,
    },
    /// Event name has no handler; nothing written.
    Ignored { user_id: UserId, event_name: String },
}

pub struct ProcessWebhookHandler {
    store: Arc<dyn SubscriptionStore>,
    verifier: SignatureVerifier,
    locks: Arc<UserLocks>,
}

impl ProcessWebhookHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, verifier: SignatureVerifier, locks: Arc<UserLocks>) -> Self {
        Self { store, verifier, locks }
    }

    pub async fn handle(&self, cmd: ProcessWebhookCommand) -> Result<ProcessWebhookResult, ProcessingError> {
        // 1. Signature over the raw bytes, before any parsing
        if !self.verifier.verify(&cmd.payload, &cmd.signature) {
            tracing::warn!(
                has_signature = !cmd.signature.is_empty(),
                has_secret = self.verifier.has_secret(),
                "Webhook signature rejected"
            );
            return Err(ProcessingError::InvalidSignature);
        }

        // 2. Parse and run the pure stages
        let payload = WebhookPayload::from_slice(&cmd.payload).map_err(|e| {
            tracing::warn!(error = %e, "Webhook body is not valid JSON");
            ProcessingError::from(e)
        })?;

        let prepared = prepare_event(&payload, Timestamp::now()).map_err(|e| {
            tracing::warn!(
                event = %payload.meta.event_name,
                subscription_id = %payload.data.id,
                error = %e,
                "Webhook rejected"
            );
            e
        })?;

        let pending = match prepared {
            PreparedEvent::Write(pending) => pending,
            PreparedEvent::Ignore { user_id, event_name } => {
                tracing::info!(user_id = %user_id, event = %event_name, "Unhandled webhook event ignored");
                return Ok(ProcessWebhookResult::Ignored { user_id, event_name });
            }
        };

        // 3. Read-modify-write, serialized per user
        let _guard = self.locks.lock(pending.user_id()).await;

        let existing = self.store.get(pending.user_id()).await.map_err(|e| {
            tracing::error!(user_id = %pending.user_id(), error = %e, "Failed to read subscription");
            ProcessingError::from(e)
        })?;

        let event = pending.kind.clone();
        let record = pending.merge_with(existing.as_ref());

        self.store.put(&record).await.map_err(|e| {
            tracing::error!(user_id = %record.user_id, error = %e, "Failed to write subscription");
            ProcessingError::from(e)
        })?;

        tracing::info!(
            user_id = %record.user_id,
            event = event.as_str(),
            tier = record.tier.as_str(),
            status = record.status.as_str(),
            "Subscription updated from webhook"
        );

        Ok(ProcessWebhookResult::Applied { event, record })
    }
}
