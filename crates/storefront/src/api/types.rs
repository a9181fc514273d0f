//! Request and response bodies for the ElectroMart API.
//!
//! Domain snapshots (products, orders, ...) live in `electromart_core`;
//! this module only holds the envelopes specific to individual endpoints.

use serde::{Deserialize, Serialize};

use electromart_core::{LoyaltyTier, OrderId, Price, ProductId, UserProfile};

/// `POST /auth/login` body.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/register` body.
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone: Option<&'a str>,
}

/// Successful login or registration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("message", &self.message)
            .finish()
    }
}

/// Query string for `GET /products`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductQuery {
    #[must_use]
    pub const fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            category: None,
        }
    }

    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// One line of a new order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `POST /orders` body.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping_address: String,
    pub loyalty_points_to_use: u64,
}

/// Outcome of placing an order, with the account's new loyalty standing.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub total_amount: Price,
    pub loyalty_points_earned: u64,
    pub new_loyalty_points: u64,
    pub new_tier: LoyaltyTier,
}

/// `POST /reviews` body.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub product_id: ProductId,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
}

/// Acknowledgement of a stored review.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewReceipt {
    #[serde(default)]
    pub message: String,
}

/// `GET /` greeting, used as a reachability probe.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiGreeting {
    pub message: String,
}

/// FastAPI-style error body: `{"detail": "..."}` or `{"detail": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

/// Extract a human-readable `detail` string from an error body, if any.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}
