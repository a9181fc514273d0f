//! The signed-in user's cached profile.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::loyalty::LoyaltyTier;

/// Profile returned by the auth endpoints.
///
/// The API owns this record. The client keeps a read-only copy that can go
/// stale (points, tier) until the next login or an explicit refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub loyalty_points: u64,
    #[serde(default)]
    pub loyalty_tier: LoyaltyTier,
}

impl UserProfile {
    /// Copy of this profile with fresh loyalty figures.
    #[must_use]
    pub fn with_loyalty(&self, points: u64, tier: LoyaltyTier) -> Self {
        Self {
            loyalty_points: points,
            loyalty_tier: tier,
            ..self.clone()
        }
    }

    /// First word of the name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_login_payload_without_phone() {
        let json = r#"{
            "id": "u1",
            "email": "a@x.com",
            "name": "Asha Rao",
            "loyalty_points": 100,
            "loyalty_tier": "bronze"
        }"#;

        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.phone, None);
        assert_eq!(user.loyalty_tier, LoyaltyTier::Bronze);
        assert_eq!(user.first_name(), "Asha");
    }

    #[test]
    fn test_with_loyalty_keeps_identity() {
        let user = UserProfile {
            id: UserId::new("u1"),
            name: "Asha".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            loyalty_points: 0,
            loyalty_tier: LoyaltyTier::Bronze,
        };

        let refreshed = user.with_loyalty(560, LoyaltyTier::Silver);
        assert_eq!(refreshed.id, user.id);
        assert_eq!(refreshed.loyalty_points, 560);
        assert_eq!(refreshed.loyalty_tier, LoyaltyTier::Silver);
    }
}
