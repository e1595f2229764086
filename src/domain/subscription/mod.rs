//! Subscription domain - tiers, records, and webhook processing.

mod errors;
mod record;
mod status;
mod tier;
mod webhook_errors;
pub mod webhook_event;
pub mod webhook_processor;
mod webhook_verifier;

pub use errors::SubscriptionError;
pub use record::{EffectiveState, ManagementUrls, SubscriptionRecord};
pub use status::{is_entitled, SubscriptionStatus};
pub use tier::{variant_for_tier, Tier, PLUS_VARIANT_ID, PRO_VARIANT_ID};
pub use webhook_errors::ProcessingError;
pub use webhook_event::{SubscriptionEventKind, WebhookPayload};
pub use webhook_processor::{prepare_event, PendingWrite, PreparedEvent};
pub use webhook_verifier::{compute_signature, verify_signature, DeploymentMode, SignatureVerifier};

#[cfg(test)]
pub(crate) use record::test_support;
