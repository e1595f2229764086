//! Pure stages of the webhook pipeline.
//!
//! ```text
//! payload ─► identity ─► tier ─► candidate record ─► transition ─► merge(existing)
//! ```
//!
//! Every stage before the merge is side-effect free, so a payload rejected
//! here never reaches the store. The application layer owns the store read
//! and write around [`PendingWrite::merge_with`].

use crate::domain::foundation::{Timestamp, UserId};

use super::webhook_event::{SubscriptionEventKind, WebhookPayload};
use super::{ManagementUrls, ProcessingError, SubscriptionRecord, SubscriptionStatus, Tier};

/// One place a subscriber id may be found in a payload.
pub type IdentityStrategy = fn(&WebhookPayload) -> Option<&str>;

/// Identity locations in priority order: per-subscription custom data set at
/// checkout, then the event-level meta copy.
pub const IDENTITY_STRATEGIES: [(&str, IdentityStrategy); 2] = [
    ("data.attributes.custom_data", from_attribute_custom_data),
    ("meta.custom_data", from_meta_custom_data),
];

fn from_attribute_custom_data(payload: &WebhookPayload) -> Option<&str> {
    payload
        .data
        .attributes
        .custom_data
        .as_ref()
        .and_then(|data| data.user_id())
}

fn from_meta_custom_data(payload: &WebhookPayload) -> Option<&str> {
    payload
        .meta
        .custom_data
        .as_ref()
        .and_then(|data| data.user_id())
}

/// First non-empty subscriber id across [`IDENTITY_STRATEGIES`].
pub fn extract_subscriber_identity(payload: &WebhookPayload) -> Result<UserId, ProcessingError> {
    IDENTITY_STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(payload))
        .and_then(|raw| UserId::new(raw).ok())
        .ok_or(ProcessingError::MissingSubscriberIdentity)
}

/// Paid tier for a variant. Variants outside the table are rejected rather
/// than recorded as free.
pub fn resolve_tier(variant_id: i64) -> Result<Tier, ProcessingError> {
    match Tier::for_variant(variant_id) {
        Tier::Free => Err(ProcessingError::UnrecognizedVariant(variant_id)),
        paid => Ok(paid),
    }
}

/// Full record as described by the payload, timestamps set to `now`.
///
/// An unparseable `ends_at` leaves `expires_at` empty.
pub fn build_candidate(
    payload: &WebhookPayload,
    user_id: UserId,
    tier: Tier,
    now: Timestamp,
) -> SubscriptionRecord {
    let attributes = &payload.data.attributes;
    let expires_at = attributes.ends_at.as_deref().and_then(|raw| {
        let parsed = Timestamp::parse_rfc3339(raw);
        if parsed.is_none() {
            tracing::warn!(ends_at = raw, "Ignoring unparseable subscription expiry");
        }
        parsed
    });

    SubscriptionRecord {
        user_id,
        tier,
        status: SubscriptionStatus::from(attributes.status.as_str()),
        variant_id: attributes.variant_id,
        subscription_id: payload.data.id.clone(),
        customer_id: attributes.customer_id.to_string(),
        email: attributes.user_email.clone(),
        created_at: now,
        updated_at: now,
        expires_at,
        urls: ManagementUrls {
            customer_portal: attributes.urls.customer_portal.clone(),
            update_payment_method: attributes.urls.update_payment_method.clone(),
            customer_portal_update_subscription: attributes
                .urls
                .customer_portal_update_subscription
                .clone(),
        },
    }
}

/// What an event does to the status field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// Keep the status the provider sent.
    Passthrough,
    /// Force a status regardless of the payload.
    Force(SubscriptionStatus),
}

impl StatusTransition {
    fn apply(&self, record: &mut SubscriptionRecord) {
        if let StatusTransition::Force(status) = self {
            record.status = status.clone();
        }
    }
}

/// Handler table. `None` means the event is acknowledged and ignored.
pub fn transition_for(kind: &SubscriptionEventKind) -> Option<StatusTransition> {
    use SubscriptionEventKind::*;

    let transition = match kind {
        Created | Updated | PlanChanged => StatusTransition::Passthrough,
        Cancelled => StatusTransition::Force(SubscriptionStatus::Cancelled),
        Resumed | Unpaused => StatusTransition::Force(SubscriptionStatus::Active),
        Expired => StatusTransition::Force(SubscriptionStatus::Expired),
        Paused => StatusTransition::Force(SubscriptionStatus::Paused),
        Unknown(_) => return None,
    };
    Some(transition)
}

/// A record ready to be merged with whatever is stored for its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub kind: SubscriptionEventKind,
    pub record: SubscriptionRecord,
}

impl PendingWrite {
    pub fn user_id(&self) -> &UserId {
        &self.record.user_id
    }

    /// Final record to put: the candidate with `created_at` carried forward
    /// from `existing` when there is one.
    pub fn merge_with(self, existing: Option<&SubscriptionRecord>) -> SubscriptionRecord {
        let mut record = self.record;
        record.inherit_created_at(existing);
        record
    }
}

/// Outcome of the pure pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedEvent {
    Write(PendingWrite),
    Ignore { user_id: UserId, event_name: String },
}

/// Runs identity extraction, tier resolution, record construction and
/// dispatch, in that order. Each stage must pass before the next runs.
pub fn prepare_event(payload: &WebhookPayload, now: Timestamp) -> Result<PreparedEvent, ProcessingError> {
    let user_id = extract_subscriber_identity(payload)?;
    let tier = resolve_tier(payload.data.attributes.variant_id)?;
    let mut record = build_candidate(payload, user_id, tier, now);

    let kind = payload.kind();
    match transition_for(&kind) {
        Some(transition) => {
            transition.apply(&mut record);
            Ok(PreparedEvent::Write(PendingWrite { kind, record }))
        }
        None => Ok(PreparedEvent::Ignore {
            user_id: record.user_id,
            event_name: kind.as_str().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::webhook_event::WebhookPayloadBuilder;
    use crate::domain::subscription::{PLUS_VARIANT_ID, PRO_VARIANT_ID};
    use serde_json::json;

    fn write_of(prepared: PreparedEvent) -> PendingWrite {
        match prepared {
            PreparedEvent::Write(write) => write,
            other => panic!("expected write, got {:?}", other),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Identity Extraction
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn attribute_custom_data_wins_over_meta() {
        let payload = WebhookPayloadBuilder::new("subscription_created")
            .attribute_user("from-attributes")
            .meta_user("from-meta")
            .build();

        assert_eq!(extract_subscriber_identity(&payload).unwrap().as_str(), "from-attributes");
    }

    #[test]
    fn falls_back_to_meta_custom_data() {
        let payload = WebhookPayloadBuilder::new("subscription_created").meta_user("u1").build();
        assert_eq!(extract_subscriber_identity(&payload).unwrap().as_str(), "u1");
    }

    #[test]
    fn empty_primary_location_falls_through() {
        let payload = WebhookPayloadBuilder::new("subscription_created")
            .attribute_user("")
            .meta_user("u2")
            .build();
        assert_eq!(extract_subscriber_identity(&payload).unwrap().as_str(), "u2");
    }

    #[test]
    fn no_identity_anywhere_is_rejected() {
        let payload = WebhookPayloadBuilder::new("subscription_created").build();
        assert_eq!(
            extract_subscriber_identity(&payload),
            Err(ProcessingError::MissingSubscriberIdentity)
        );
    }

    #[test]
    fn strategies_are_listed_in_priority_order() {
        let names: Vec<&str> = IDENTITY_STRATEGIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["data.attributes.custom_data", "meta.custom_data"]);
    }

    // ══════════════════════════════════════════════════════════════
    // Tier Resolution
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn known_variants_resolve() {
        assert_eq!(resolve_tier(PLUS_VARIANT_ID), Ok(Tier::Plus));
        assert_eq!(resolve_tier(PRO_VARIANT_ID), Ok(Tier::Pro));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert_eq!(resolve_tier(999_999), Err(ProcessingError::UnrecognizedVariant(999_999)));
        assert_eq!(resolve_tier(0), Err(ProcessingError::UnrecognizedVariant(0)));
    }

    // ══════════════════════════════════════════════════════════════
    // Record Construction
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn candidate_copies_payload_fields() {
        let now = Timestamp::now();
        let payload = WebhookPayloadBuilder::new("subscription_created")
            .meta_user("u1")
            .attribute("ends_at", json!("2031-05-01T00:00:00Z"))
            .build();

        let record = build_candidate(&payload, UserId::new("u1").unwrap(), Tier::Plus, now);

        assert_eq!(record.subscription_id, "sub_1");
        assert_eq!(record.customer_id, "42");
        assert_eq!(record.email, "buyer@example.com");
        assert_eq!(record.variant_id, PLUS_VARIANT_ID);
        assert_eq!(record.urls.customer_portal, "https://portal.example/c");
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
        assert_eq!(record.expires_at.unwrap().to_rfc3339(), "2031-05-01T00:00:00Z");
    }

    #[test]
    fn unparseable_ends_at_is_tolerated() {
        let payload = WebhookPayloadBuilder::new("subscription_created")
            .meta_user("u1")
            .attribute("ends_at", json!("soon"))
            .build();

        let record = build_candidate(&payload, UserId::new("u1").unwrap(), Tier::Plus, Timestamp::now());

        assert!(record.expires_at.is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Dispatch
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn transition_table_matches_event_kinds() {
        use SubscriptionEventKind::*;
        let cases = [
            (Created, StatusTransition::Passthrough),
            (Updated, StatusTransition::Passthrough),
            (PlanChanged, StatusTransition::Passthrough),
            (Cancelled, StatusTransition::Force(SubscriptionStatus::Cancelled)),
            (Resumed, StatusTransition::Force(SubscriptionStatus::Active)),
            (Expired, StatusTransition::Force(SubscriptionStatus::Expired)),
            (Paused, StatusTransition::Force(SubscriptionStatus::Paused)),
            (Unpaused, StatusTransition::Force(SubscriptionStatus::Active)),
        ];
        for (kind, expected) in cases {
            assert_eq!(transition_for(&kind), Some(expected), "{}", kind.as_str());
        }
        assert_eq!(transition_for(&Unknown("order_created".into())), None);
    }

    #[test]
    fn cancelled_event_overrides_payload_status() {
        let payload = WebhookPayloadBuilder::new("subscription_cancelled")
            .meta_user("u1")
            .attribute("status", json!("active"))
            .build();

        let write = write_of(prepare_event(&payload, Timestamp::now()).unwrap());

        assert_eq!(write.record.status, SubscriptionStatus::Cancelled);
        assert_eq!(write.kind, SubscriptionEventKind::Cancelled);
    }

    #[test]
    fn updated_event_passes_status_through() {
        let payload = WebhookPayloadBuilder::new("subscription_updated")
            .meta_user("u1")
            .attribute("status", json!("past_due"))
            .build();

        let write = write_of(prepare_event(&payload, Timestamp::now()).unwrap());

        assert_eq!(write.record.status, SubscriptionStatus::PastDue);
    }

    #[test]
    fn plan_change_reflects_new_variant() {
        let payload = WebhookPayloadBuilder::new("subscription_plan_changed")
            .meta_user("u1")
            .attribute("variant_id", json!(PRO_VARIANT_ID))
            .build();

        let write = write_of(prepare_event(&payload, Timestamp::now()).unwrap());

        assert_eq!(write.record.tier, Tier::Pro);
        assert_eq!(write.record.variant_id, PRO_VARIANT_ID);
    }

    #[test]
    fn unknown_event_is_ignored_after_validation() {
        let payload = WebhookPayloadBuilder::new("order_refunded").meta_user("u1").build();

        let prepared = prepare_event(&payload, Timestamp::now()).unwrap();

        assert_eq!(
            prepared,
            PreparedEvent::Ignore {
                user_id: UserId::new("u1").unwrap(),
                event_name: "order_refunded".to_string()
            }
        );
    }

    #[test]
    fn identity_is_checked_before_tier() {
        let payload = WebhookPayloadBuilder::new("subscription_created")
            .attribute("variant_id", json!(1))
            .build();

        assert_eq!(
            prepare_event(&payload, Timestamp::now()),
            Err(ProcessingError::MissingSubscriberIdentity)
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Merge
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn merge_preserves_existing_created_at() {
        let first_at = Timestamp::now();
        let payload = WebhookPayloadBuilder::new("subscription_created").meta_user("u1").build();
        let first = write_of(prepare_event(&payload, first_at).unwrap()).merge_with(None);

        let later = first_at.plus_secs(3600);
        let cancel = WebhookPayloadBuilder::new("subscription_cancelled").meta_user("u1").build();
        let second = write_of(prepare_event(&cancel, later).unwrap()).merge_with(Some(&first));

        assert_eq!(second.created_at, first_at);
        assert_eq!(second.updated_at, later);
        assert_eq!(second.tier, Tier::Plus);
    }

    #[test]
    fn merge_without_existing_uses_now() {
        let now = Timestamp::now();
        let payload = WebhookPayloadBuilder::new("subscription_created").meta_user("u1").build();

        let record = write_of(prepare_event(&payload, now).unwrap()).merge_with(None);

        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.created_at, now);
    }
}
