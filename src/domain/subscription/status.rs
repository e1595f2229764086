//! Subscription status as reported by the payment provider.
//!
//! Provider statuses are open-ended strings. The ones this service reasons
//! about get their own variant; anything else is carried verbatim in
//! [`SubscriptionStatus::Other`] so a full-record overwrite never loses it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Unpaid,
    Cancelled,
    Expired,
    Paused,
    /// No subscription on file; only ever synthesized, never stored.
    Inactive,
    Other(String),
}

impl SubscriptionStatus {
    /// Whether this status currently grants paid entitlement.
    ///
    /// Only active, trialing and past_due qualify.
    pub fn is_entitled(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing | SubscriptionStatus::PastDue
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Other(raw) => raw,
        }
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" => SubscriptionStatus::PastDue,
            "unpaid" => SubscriptionStatus::Unpaid,
            "cancelled" => SubscriptionStatus::Cancelled,
            "expired" => SubscriptionStatus::Expired,
            "paused" => SubscriptionStatus::Paused,
            "inactive" => SubscriptionStatus::Inactive,
            other => SubscriptionStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(raw: String) -> Self {
        SubscriptionStatus::from(raw.as_str())
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Entitlement check on a raw provider status string.
pub fn is_entitled(status: &str) -> bool {
    SubscriptionStatus::from(status).is_entitled()
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn entitled_statuses() {
        assert!(is_entitled("active"));
        assert!(is_entitled("trialing"));
        assert!(is_entitled("past_due"));
    }

    #[test]
    fn non_entitled_statuses() {
        for status in ["cancelled", "expired", "paused", "unpaid", "inactive", "on_trial", "", "ACTIVE"] {
            assert!(!is_entitled(status), "{} should not be entitled", status);
        }
    }

    #[test]
    fn provider_specific_values_are_preserved() {
        let status = SubscriptionStatus::from("on_trial");
        assert_eq!(status, SubscriptionStatus::Other("on_trial".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"on_trial\"");
    }

    #[test]
    fn deserializes_known_values() {
        let status: SubscriptionStatus = serde_json::from_str("\"past_due\"").unwrap();
        assert_eq!(status, SubscriptionStatus::PastDue);
    }

    proptest! {
        #[test]
        fn string_form_is_stable(raw in "[a-z_]{0,12}") {
            let status = SubscriptionStatus::from(raw.as_str());
            prop_assert_eq!(status.as_str(), raw.as_str());
        }
    }
}
