//! Subscription tiers and the provider variant table.
//!
//! The payment provider sells "variants"; this service only cares about the
//! tier a variant unlocks. The mapping is total: any variant that is not in
//! the table resolves to [`Tier::Free`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider variant sold as the Plus plan.
pub const PLUS_VARIANT_ID: i64 = 890080;

/// Provider variant sold as the Pro plan.
pub const PRO_VARIANT_ID: i64 = 890081;

/// Subscription tier controlling entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Plus,
    Pro,
}

impl Tier {
    /// Resolves a provider variant to a tier. Unknown variants are free.
    pub fn for_variant(variant_id: i64) -> Tier {
        match variant_id {
            PLUS_VARIANT_ID => Tier::Plus,
            PRO_VARIANT_ID => Tier::Pro,
            _ => Tier::Free,
        }
    }

    /// The variant sold for this tier, `None` for free.
    pub fn variant_id(&self) -> Option<i64> {
        match self {
            Tier::Free => None,
            Tier::Plus => Some(PLUS_VARIANT_ID),
            Tier::Pro => Some(PRO_VARIANT_ID),
        }
    }

    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Option<Tier> {
        match name.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Tier::Free),
            "plus" => Some(Tier::Plus),
            "pro" => Some(Tier::Pro),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Tier::Free)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Plus => "plus",
            Tier::Pro => "pro",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant sold for a tier name, `None` for free or unknown names.
pub fn variant_for_tier(name: &str) -> Option<i64> {
    Tier::parse(name).and_then(|tier| tier.variant_id())
}
