//! Catalog snapshots: products, categories, reviews.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, ReviewId, UserId};
use super::price::Price;
use super::timestamp::Timestamp;

/// A product as listed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub price: Price,
    /// Category name (the API links products to categories by name).
    #[serde(default)]
    pub category: String,
    pub image_url: String,
    #[serde(default)]
    pub specifications: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub warranty_months: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl Product {
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Specification rows with string values unquoted.
    #[must_use]
    pub fn specification_rows(&self) -> Vec<(String, String)> {
        self.specifications
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.replace('_', " "), value)
            })
            .collect()
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_parses_api_shape() {
        let json = r#"{
            "id": "p1",
            "name": "Sony WH-1000XM5",
            "description": "Premium noise canceling headphones",
            "price": 29990.0,
            "brand": "Sony",
            "category": "Headphones",
            "image_url": "https://img.example/sony.jpg",
            "specifications": {"battery_life": "30 hours", "weight_grams": 250},
            "stock_quantity": 30,
            "warranty_months": 24,
            "rating": 4.5,
            "review_count": 12,
            "created_at": "2024-01-01T00:00:00",
            "is_active": true
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Price::from_rupees(29990));
        assert!(product.is_in_stock());
        assert_eq!(
            product.specification_rows(),
            vec![
                ("battery life".to_string(), "30 hours".to_string()),
                ("weight grams".to_string(), "250".to_string()),
            ]
        );
    }

    #[test]
    fn test_category_image_is_optional() {
        let json = r#"{"id": "c1", "name": "Smartwatches", "description": "Wearables"}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.image_url, None);
    }
}
