//! Display models for templates.
//!
//! Every value here is derived from fetched data and the current session;
//! nothing is stored. Formatting (currency, stock labels, tier classes)
//! happens in these conversions so templates stay declarative.

use electromart_core::{
    Category, LoyaltyStatus, LoyaltyTier, Order, OrderStatus, Price, Product, Review, TierBenefits,
    UserProfile,
};

use crate::pages::{FetchError, Fetched};

/// CSS class for a tier badge, e.g. `tier-gold`.
#[must_use]
pub fn tier_class(tier: LoyaltyTier) -> String {
    format!("tier-{}", tier.as_str())
}

// =============================================================================
// Header
// =============================================================================

/// The account area of the site header.
#[derive(Debug, Clone, Default)]
pub struct HeaderView {
    pub signed_in: bool,
    pub first_name: String,
    /// e.g. `"120 pts"`
    pub points_label: String,
    /// Wire name, e.g. `"bronze"`
    pub tier: String,
    pub tier_class: String,
}

impl HeaderView {
    #[must_use]
    pub fn new(user: Option<&UserProfile>) -> Self {
        user.map_or_else(Self::default, |user| Self {
            signed_in: true,
            first_name: user.first_name().to_string(),
            points_label: format!("{} pts", user.loyalty_points),
            tier: user.loyalty_tier.as_str().to_string(),
            tier_class: tier_class(user.loyalty_tier),
        })
    }
}

// =============================================================================
// Products
// =============================================================================

/// A product tile in a grid.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub brand: String,
    pub image_url: String,
    pub price: String,
    pub rating: String,
    pub review_count: u32,
    pub in_stock: bool,
    pub stock_label: &'static str,
    /// Needs a session and stock.
    pub can_add_to_cart: bool,
    /// Points the purchase would earn; only computed for a signed-in user.
    pub points_hint: Option<u64>,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, signed_in: bool) -> Self {
        let in_stock = product.is_in_stock();
        Self {
            id: product.id.to_string(),
            href: format!("/products/{}", urlencoding::encode(product.id.as_str())),
            name: product.name.clone(),
            brand: product.brand.clone(),
            image_url: product.image_url.clone(),
            price: product.price.to_string(),
            rating: format!("{:.1}", product.rating),
            review_count: product.review_count,
            in_stock,
            stock_label: if in_stock { "In Stock" } else { "Out of Stock" },
            can_add_to_cart: in_stock && signed_in,
            points_hint: signed_in.then(|| product.price.points_estimate()),
        }
    }

    /// Cards for a list of products.
    #[must_use]
    pub fn list(products: &[Product], signed_in: bool) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, signed_in)).collect()
    }
}

/// One specification row on the detail page.
#[derive(Debug, Clone)]
pub struct SpecRow {
    pub name: String,
    pub value: String,
}

/// Product detail: the card plus the long-form fields.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub category: String,
    pub category_href: String,
    pub stock_quantity: u32,
    pub warranty: Option<String>,
    pub specs: Vec<SpecRow>,
}

impl ProductDetailView {
    #[must_use]
    pub fn new(product: &Product, signed_in: bool) -> Self {
        Self {
            card: ProductCardView::new(product, signed_in),
            description: product.description.clone(),
            category: product.category.clone(),
            category_href: category_href(&product.category),
            stock_quantity: product.stock_quantity,
            warranty: (product.warranty_months > 0).then(|| match product.warranty_months {
                1 => "1 month warranty".to_string(),
                months => format!("{months} months warranty"),
            }),
            specs: product
                .specification_rows()
                .into_iter()
                .map(|(name, value)| SpecRow { name, value })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewView {
    pub stars: String,
    pub rating: u8,
    pub comment: String,
    pub date: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        let filled = usize::from(review.rating.min(5));
        Self {
            stars: format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled)),
            rating: review.rating,
            comment: review.comment.clone(),
            date: review.created_at.date_label(),
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

fn category_href(name: &str) -> String {
    format!("/products?category={}", urlencoding::encode(name))
}

#[derive(Debug, Clone)]
pub struct CategoryView {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Product listing filtered to this category.
    pub href: String,
    pub active: bool,
}

impl CategoryView {
    #[must_use]
    pub fn new(category: &Category, active: Option<&str>) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone(),
            href: category_href(&category.name),
            active: active.is_some_and(|a| a.eq_ignore_ascii_case(&category.name)),
        }
    }

    #[must_use]
    pub fn list(categories: &[Category], active: Option<&str>) -> Vec<Self> {
        categories.iter().map(|c| Self::new(c, active)).collect()
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub total: String,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub date: String,
    pub status: &'static str,
    pub status_class: String,
    pub payment_status: &'static str,
    pub total: String,
    pub discount: Option<String>,
    pub points_earned: u64,
    pub points_used: u64,
    pub unit_count: u32,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let status_class = match order.order_status {
            OrderStatus::Unknown => "status-processing".to_string(),
            status => format!("status-{}", status.label().to_lowercase()),
        };
        Self {
            id: order.id.to_string(),
            date: order.created_at.date_label(),
            status: order.order_status.label(),
            status_class,
            payment_status: order.payment_status.label(),
            total: order.total_amount.to_string(),
            discount: (order.discount_amount > Price::ZERO)
                .then(|| order.discount_amount.to_string()),
            points_earned: order.loyalty_points_earned,
            points_used: order.loyalty_points_used,
            unit_count: order.unit_count(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    total: item.total.to_string(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Loyalty
// =============================================================================

/// One row of the tier ladder.
#[derive(Debug, Clone)]
pub struct TierRowView {
    pub title: &'static str,
    pub class: String,
    pub threshold: String,
    pub discount: String,
    pub current: bool,
}

/// The loyalty card on the loyalty page.
#[derive(Debug, Clone)]
pub struct LoyaltyCardView {
    pub tier_title: &'static str,
    pub tier_class: String,
    pub points: u64,
    pub total_spent: String,
    pub perks: Vec<String>,
    /// e.g. "Spend ₹13,000 more to reach Gold"
    pub next_tier_hint: Option<String>,
    pub tiers: Vec<TierRowView>,
}

impl From<&LoyaltyStatus> for LoyaltyCardView {
    fn from(status: &LoyaltyStatus) -> Self {
        Self {
            tier_title: status.tier.title(),
            tier_class: tier_class(status.tier),
            points: status.points,
            total_spent: status.total_spent.to_string(),
            perks: status
                .current_benefits()
                .map(TierBenefits::perks)
                .unwrap_or_default(),
            next_tier_hint: status
                .next_tier_gap()
                .map(|(next, gap)| format!("Spend {gap} more to reach {}", next.title())),
            tiers: LoyaltyTier::ALL
                .iter()
                .map(|tier| TierRowView {
                    title: tier.title(),
                    class: tier_class(*tier),
                    threshold: tier.threshold().to_string(),
                    discount: status
                        .benefits
                        .get(tier)
                        .map(|b| b.discount.clone())
                        .unwrap_or_default(),
                    current: *tier == status.tier,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// A page section built from one read.
///
/// A failed read becomes an empty section with a notice instead of an error
/// page.
#[derive(Debug, Clone)]
pub struct Section<T> {
    pub items: Vec<T>,
    pub notice: Option<String>,
}

impl<T> Section<T> {
    /// Build a section from a read, mapping each loaded entry.
    pub fn from_fetched<S>(fetched: &Fetched<Vec<S>>, map: impl Fn(&S) -> T) -> Self {
        match fetched {
            Fetched::Loaded(entries) => Self {
                items: entries.iter().map(map).collect(),
                notice: None,
            },
            Fetched::Failed(FetchError { reason, .. }) => Self {
                items: Vec::new(),
                notice: Some(reason.clone()),
            },
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use electromart_core::{CategoryId, ProductId, UserId};

    use super::*;
    use crate::pages::FetchErrorKind;

    fn product(price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Sony WH-1000XM5".to_string(),
            description: "Noise cancelling headphones".to_string(),
            brand: "Sony".to_string(),
            price: Price::from_rupees(price),
            category: "Audio & Headphones".to_string(),
            image_url: "https://img.example/p1.jpg".to_string(),
            specifications: BTreeMap::new(),
            stock_quantity: stock,
            warranty_months: 12,
            rating: 4.55,
            review_count: 10,
        }
    }

    fn user(points: u64) -> UserProfile {
        UserProfile {
            id: UserId::new("u1"),
            name: "Asha Rao".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            loyalty_points: points,
            loyalty_tier: LoyaltyTier::Bronze,
        }
    }

    #[test]
    fn test_header_for_new_user() {
        let header = HeaderView::new(Some(&user(0)));
        assert!(header.signed_in);
        assert_eq!(header.points_label, "0 pts");
        assert_eq!(header.tier, "bronze");
        assert_eq!(header.tier_class, "tier-bronze");
        assert_eq!(header.first_name, "Asha");
    }

    #[test]
    fn test_header_signed_out() {
        let header = HeaderView::new(None);
        assert!(!header.signed_in);
        assert!(header.points_label.is_empty());
    }

    #[test]
    fn test_out_of_stock_card() {
        let signed_out = ProductCardView::new(&product(45_000, 0), false);
        assert_eq!(signed_out.stock_label, "Out of Stock");
        assert!(!signed_out.can_add_to_cart);
        assert_eq!(signed_out.points_hint, None);
        assert_eq!(signed_out.price, "₹45,000");

        let signed_in = ProductCardView::new(&product(45_000, 0), true);
        assert!(!signed_in.can_add_to_cart);
        assert_eq!(signed_in.points_hint, Some(450));
    }

    #[test]
    fn test_in_stock_card_needs_session_to_buy() {
        assert!(!ProductCardView::new(&product(2_999, 5), false).can_add_to_cart);

        let card = ProductCardView::new(&product(2_999, 5), true);
        assert!(card.can_add_to_cart);
        assert_eq!(card.stock_label, "In Stock");
        assert_eq!(card.points_hint, Some(29));
    }

    #[test]
    fn test_category_href_is_encoded() {
        let category = Category {
            id: CategoryId::new("c1"),
            name: "Audio & Headphones".to_string(),
            description: String::new(),
            image_url: None,
        };
        let view = CategoryView::new(&category, Some("audio & headphones"));
        assert_eq!(view.href, "/products?category=Audio%20%26%20Headphones");
        assert!(view.active);
    }

    #[test]
    fn test_loyalty_card_hint_and_ladder() {
        let status: LoyaltyStatus = serde_json::from_str(
            r#"{"tier": "silver", "points": 250, "total_spent": 12000,
                "benefits": {"silver": {"discount": "10%", "free_shipping": true}}}"#,
        )
        .unwrap();

        let card = LoyaltyCardView::from(&status);
        assert_eq!(card.tier_title, "Silver");
        assert_eq!(
            card.next_tier_hint.as_deref(),
            Some("Spend ₹13,000 more to reach Gold")
        );
        assert_eq!(card.perks, vec!["10% off every order", "Free shipping"]);
        assert_eq!(card.tiers.len(), 4);
        assert!(card.tiers.iter().any(|t| t.current && t.title == "Silver"));
    }

    #[test]
    fn test_section_from_failed_read() {
        let failed: Fetched<Vec<Product>> = Fetched::Failed(FetchError {
            kind: FetchErrorKind::Unavailable,
            reason: "Unable to load products right now.".to_string(),
        });
        let section = Section::from_fetched(&failed, |p| ProductCardView::new(p, false));
        assert!(section.is_empty());
        assert_eq!(
            section.notice.as_deref(),
            Some("Unable to load products right now.")
        );
    }
}
