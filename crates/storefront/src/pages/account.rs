//! Pages that need a session: loyalty status and order history.
//!
//! Without a session these settle to [`LoadState::LoginRequired`] before any
//! request is made.

use electromart_core::{LoyaltyStatus, Order};

use super::{Fetched, LoadState, LoadTask, PageLoader};

/// Loyalty card plus recent orders.
#[derive(Debug, Clone)]
pub struct LoyaltyPage {
    pub status: Fetched<LoyaltyStatus>,
    pub orders: Fetched<Vec<Order>>,
}

#[derive(Debug, Clone)]
pub struct OrdersPage {
    pub orders: Fetched<Vec<Order>>,
}

impl PageLoader {
    /// Start loading the loyalty page.
    #[must_use]
    pub fn loyalty(&self) -> LoadTask<LoyaltyPage> {
        let loader = self.clone();
        LoadTask::spawn(async move {
            let Some(token) = loader.session.token() else {
                return LoadState::LoginRequired;
            };

            let (status, orders) =
                tokio::join!(loader.api.loyalty_status(&token), loader.api.orders(&token));

            LoadState::Ready(LoyaltyPage {
                status: Fetched::from_result(status, "loyalty status"),
                orders: Fetched::from_result(orders, "orders"),
            })
        })
    }

    /// Start loading the order history.
    #[must_use]
    pub fn orders(&self) -> LoadTask<OrdersPage> {
        let loader = self.clone();
        LoadTask::spawn(async move {
            let Some(token) = loader.session.token() else {
                return LoadState::LoginRequired;
            };

            LoadState::Ready(OrdersPage {
                orders: Fetched::from_result(loader.api.orders(&token).await, "orders"),
            })
        })
    }
}
