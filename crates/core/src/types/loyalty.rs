//! Loyalty program types.
//!
//! Tier and point balances are computed by the API; the client only reads
//! them. The tier thresholds here mirror the published program rules and
//! are used for display hints ("spend ₹X more to reach Gold").

use std::collections::BTreeMap;

use core::fmt;

use serde::{Deserialize, Serialize};

use super::price::Price;

/// A named loyalty level.
///
/// Ordered from lowest to highest, so `Bronze < Platinum`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    /// Every tier, lowest first.
    pub const ALL: [Self; 4] = [Self::Bronze, Self::Silver, Self::Gold, Self::Platinum];

    /// Wire name, as the API spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Capitalized name for headings.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }

    /// Lifetime spend at which the tier is granted.
    #[must_use]
    pub fn threshold(&self) -> Price {
        match self {
            Self::Bronze => Price::ZERO,
            Self::Silver => Price::from_rupees(10_000),
            Self::Gold => Price::from_rupees(25_000),
            Self::Platinum => Price::from_rupees(50_000),
        }
    }

    /// The tier above this one, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Perks attached to a tier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierBenefits {
    /// Discount as the API phrases it, e.g. `"10%"`.
    pub discount: String,
    #[serde(default)]
    pub free_shipping: bool,
    #[serde(default)]
    pub priority_support: bool,
    #[serde(default)]
    pub exclusive_access: bool,
}

impl TierBenefits {
    /// Human-readable perk list, discount first.
    #[must_use]
    pub fn perks(&self) -> Vec<String> {
        let mut perks = vec![format!("{} off every order", self.discount)];
        if self.free_shipping {
            perks.push("Free shipping".to_string());
        }
        if self.priority_support {
            perks.push("Priority support".to_string());
        }
        if self.exclusive_access {
            perks.push("Exclusive access to launches".to_string());
        }
        perks
    }
}

/// The signed-in user's standing in the loyalty program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyStatus {
    pub tier: LoyaltyTier,
    pub points: u64,
    #[serde(default)]
    pub total_spent: Price,
    #[serde(default)]
    pub benefits: BTreeMap<LoyaltyTier, TierBenefits>,
}

impl LoyaltyStatus {
    /// Benefits of the current tier, when the API listed them.
    #[must_use]
    pub fn current_benefits(&self) -> Option<&TierBenefits> {
        self.benefits.get(&self.tier)
    }

    /// The next tier and the spend still needed to reach it.
    ///
    /// `None` at the top tier.
    #[must_use]
    pub fn next_tier_gap(&self) -> Option<(LoyaltyTier, Price)> {
        let next = self.tier.next()?;
        Some((next, next.threshold().saturating_sub(self.total_spent)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STATUS_JSON: &str = r#"{
        "points": 250,
        "tier": "silver",
        "total_spent": 12000.0,
        "benefits": {
            "bronze": {"discount": "5%", "free_shipping": false},
            "silver": {"discount": "10%", "free_shipping": true},
            "gold": {"discount": "15%", "free_shipping": true, "priority_support": true},
            "platinum": {"discount": "20%", "free_shipping": true, "priority_support": true, "exclusive_access": true}
        }
    }"#;

    #[test]
    fn test_tier_wire_names() {
        let tier: LoyaltyTier = serde_json::from_str("\"platinum\"").unwrap();
        assert_eq!(tier, LoyaltyTier::Platinum);
        assert_eq!(serde_json::to_string(&LoyaltyTier::Gold).unwrap(), "\"gold\"");
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(LoyaltyTier::Bronze < LoyaltyTier::Silver);
        assert!(LoyaltyTier::Gold < LoyaltyTier::Platinum);
        assert_eq!(LoyaltyTier::Platinum.next(), None);
    }

    #[test]
    fn test_status_parses_benefit_map() {
        let status: LoyaltyStatus = serde_json::from_str(STATUS_JSON).unwrap();
        assert_eq!(status.tier, LoyaltyTier::Silver);
        assert_eq!(status.benefits.len(), 4);

        let benefits = status.current_benefits().unwrap();
        assert_eq!(benefits.discount, "10%");
        assert!(benefits.free_shipping);
        assert!(!benefits.priority_support);
    }

    #[test]
    fn test_next_tier_gap() {
        let status: LoyaltyStatus = serde_json::from_str(STATUS_JSON).unwrap();
        let (next, gap) = status.next_tier_gap().unwrap();
        assert_eq!(next, LoyaltyTier::Gold);
        assert_eq!(gap, Price::from_rupees(13_000));
    }

    #[test]
    fn test_perks_list_optional_flags() {
        let platinum = TierBenefits {
            discount: "20%".to_string(),
            free_shipping: true,
            priority_support: true,
            exclusive_access: true,
        };
        assert_eq!(platinum.perks().len(), 4);
        assert_eq!(platinum.perks()[0], "20% off every order");

        let bronze = TierBenefits {
            discount: "5%".to_string(),
            ..TierBenefits::default()
        };
        assert_eq!(bronze.perks(), vec!["5% off every order".to_string()]);
    }
}
