//! Read-only account commands: loyalty and orders.

use electromart_storefront::pages::{Fetched, LoadState};
use electromart_storefront::views::{LoyaltyCardView, OrderView};

use super::{CliError, Context};

fn settled<T>(state: LoadState<T>) -> Result<T, CliError> {
    match state {
        LoadState::Ready(page) => Ok(page),
        LoadState::LoginRequired => Err(CliError::NotSignedIn),
        LoadState::Failed(reason) => Err(CliError::Unavailable(reason)),
        LoadState::Pending => Err(CliError::Unavailable("Load did not finish".to_string())),
    }
}

fn loaded<T>(fetched: Fetched<T>) -> Result<T, CliError> {
    match fetched {
        Fetched::Loaded(value) => Ok(value),
        Fetched::Failed(err) => Err(CliError::Unavailable(err.reason)),
    }
}

/// Print loyalty tier, points, benefits and the next-tier hint.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or
/// `CliError::Unavailable` if the status could not be read.
pub async fn loyalty(ctx: &Context) -> Result<(), CliError> {
    let page = settled(ctx.pages.loyalty().settled().await)?;
    let card = LoyaltyCardView::from(&loaded(page.status)?);

    tracing::info!("{} member: {} points", card.tier_title, card.points);
    tracing::info!("Total spent: {}", card.total_spent);
    for perk in &card.perks {
        tracing::info!("  - {perk}");
    }
    if let Some(hint) = &card.next_tier_hint {
        tracing::info!("{hint}");
    }
    Ok(())
}

/// Print the order history, newest first.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or
/// `CliError::Unavailable` if the orders could not be read.
pub async fn orders(ctx: &Context) -> Result<(), CliError> {
    let page = settled(ctx.pages.orders().settled().await)?;
    let orders = loaded(page.orders)?;

    if orders.is_empty() {
        tracing::info!("No orders yet");
        return Ok(());
    }

    for order in orders.iter().map(OrderView::from) {
        tracing::info!(
            "{}  {}  {} item(s)  {}  {}  +{} pts",
            order.id,
            order.date,
            order.unit_count,
            order.total,
            order.status,
            order.points_earned
        );
    }
    Ok(())
}
