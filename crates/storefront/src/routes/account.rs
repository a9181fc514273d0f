//! Account route handlers.
//!
//! These routes require a session. Without one they render a login prompt
//! and the API is never called.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::pages::{Fetched, LoadState, LoyaltyPage};
use crate::state::AppState;
use crate::views::{HeaderView, LoyaltyCardView, OrderView, Section};

/// Orders shown under the loyalty card.
const RECENT_ORDERS: usize = 5;

/// Query parameters for the order history.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    /// Id of an order that was just placed.
    pub placed: Option<String>,
}

/// Loyalty page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/loyalty.html")]
pub struct LoyaltyTemplate {
    pub header: HeaderView,
    /// Absent when the status read failed; the page still renders.
    pub loyalty_card: Option<LoyaltyCardView>,
    pub loyalty_notice: Option<String>,
    pub orders: Section<OrderView>,
}

impl LoyaltyTemplate {
    #[must_use]
    pub fn new(header: HeaderView, page: &LoyaltyPage) -> Self {
        let (loyalty_card, loyalty_notice) = match &page.status {
            Fetched::Loaded(status) => (Some(LoyaltyCardView::from(status)), None),
            Fetched::Failed(err) => (None, Some(err.reason.clone())),
        };
        let mut orders = Section::from_fetched(&page.orders, |o| OrderView::from(o));
        orders.items.truncate(RECENT_ORDERS);

        Self {
            header,
            loyalty_card,
            loyalty_notice,
            orders,
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub header: HeaderView,
    pub placed: Option<String>,
    pub orders: Section<OrderView>,
}

/// Display the loyalty card and recent orders.
#[instrument(skip(state))]
pub async fn loyalty(State(state): State<AppState>) -> Response {
    let load = state.pages().loyalty();
    let header = state.header();

    match load.settled().await {
        LoadState::Ready(page) => LoyaltyTemplate::new(header, &page).into_response(),
        other => super::unsettled(other, header, "/loyalty"),
    }
}

/// Display the order history.
#[instrument(skip(state))]
pub async fn orders(State(state): State<AppState>, Query(query): Query<OrdersQuery>) -> Response {
    let load = state.pages().orders();
    let header = state.header();

    match load.settled().await {
        LoadState::Ready(page) => OrdersTemplate {
            header,
            placed: query.placed,
            orders: Section::from_fetched(&page.orders, |o| OrderView::from(o)),
        }
        .into_response(),
        other => super::unsettled(other, header, "/orders"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use electromart_core::Order;

    use super::*;
    use crate::pages::{FetchError, FetchErrorKind};

    fn order_json(id: &str) -> String {
        format!(
            r#"{{"id": "{id}", "created_at": "2024-03-01T10:15:30", "order_status": "delivered",
                "total_amount": 2999, "loyalty_points_earned": 29, "payment_status": "completed"}}"#
        )
    }

    #[test]
    fn test_failed_status_renders_without_card() {
        let page = LoyaltyPage {
            status: Fetched::Failed(FetchError {
                kind: FetchErrorKind::Unavailable,
                reason: "Unable to load loyalty status right now.".to_string(),
            }),
            orders: Fetched::Loaded(vec![serde_json::from_str(&order_json("o1")).unwrap()]),
        };

        let template = LoyaltyTemplate::new(HeaderView::default(), &page);
        assert!(template.loyalty_card.is_none());

        let html = template.render().unwrap();
        assert!(!html.contains("loyalty-card"));
        assert!(html.contains("Unable to load loyalty status right now."));
        assert!(html.contains("o1"));
        assert!(html.contains("Delivered"));
    }

    #[test]
    fn test_recent_orders_are_capped() {
        let orders = (0..8)
            .map(|i| serde_json::from_str(&order_json(&format!("o{i}"))).unwrap())
            .collect();
        let page = LoyaltyPage {
            status: Fetched::Loaded(
                serde_json::from_str(r#"{"tier": "bronze", "points": 29}"#).unwrap(),
            ),
            orders: Fetched::Loaded(orders),
        };

        let template = LoyaltyTemplate::new(HeaderView::default(), &page);
        assert_eq!(template.orders.items.len(), RECENT_ORDERS);
        assert!(template.render().unwrap().contains("Bronze Member"));
    }

    #[test]
    fn test_orders_page_empty_state() {
        let empty: Fetched<Vec<Order>> = Fetched::Loaded(Vec::new());
        let html = OrdersTemplate {
            header: HeaderView::default(),
            placed: Some("o9".to_string()),
            orders: Section::from_fetched(&empty, |o| OrderView::from(o)),
        }
        .render()
        .unwrap();
        assert!(html.contains("Order o9 placed."));
        assert!(html.contains("You have not placed any orders yet."));
    }
}
