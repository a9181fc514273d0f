//! Order history snapshots.

use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};
use super::price::Price;
use super::status::{OrderStatus, PaymentStatus};
use super::timestamp::Timestamp;

/// A placed order, as returned by the order history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: Timestamp,
    #[serde(default)]
    pub order_status: OrderStatus,
    pub total_amount: Price,
    #[serde(default)]
    pub loyalty_points_earned: u64,
    #[serde(default)]
    pub loyalty_points_used: u64,
    #[serde(default)]
    pub discount_amount: Price,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub shipping_address: String,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// One line of an order, priced at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub total: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parses_history_entry() {
        let json = r#"{
            "id": "o1",
            "user_id": "u1",
            "items": [
                {"product_id": "p1", "name": "Anker PowerCore", "price": 2999.0, "quantity": 2, "total": 5998.0}
            ],
            "total_amount": 5898.0,
            "discount_amount": 100.0,
            "loyalty_points_used": 100,
            "loyalty_points_earned": 58,
            "payment_method": "UPI",
            "payment_status": "pending",
            "order_status": "placed",
            "shipping_address": "12 MG Road, Bengaluru",
            "created_at": "2024-03-01T10:15:30.123456"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_status, OrderStatus::Placed);
        assert_eq!(order.loyalty_points_earned, 58);
        assert_eq!(order.unit_count(), 2);
        assert_eq!(order.total_amount.to_string(), "₹5,898");
    }

    #[test]
    fn test_order_minimal_fields() {
        let json = r#"{
            "id": "o2",
            "created_at": "2024-03-01T10:15:30",
            "order_status": "confirmed",
            "total_amount": 100,
            "loyalty_points_earned": 1
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert!(order.items.is_empty());
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }
}
