//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use electromart_core::ProductId;

use crate::api::{ApiError, OrderLine, OrderRequest, ReviewRequest};
use crate::filters;
use crate::pages::{FetchErrorKind, Fetched, LoadState, ProductDetailPage, ProductListPage};
use crate::state::AppState;
use crate::views::{
    CategoryView, HeaderView, ProductCardView, ProductDetailView, ReviewView, Section,
};

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub limit: Option<u32>,
}

/// Detail page query parameters.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    /// Message from a failed purchase.
    pub error: Option<String>,
    /// Message from a rejected review.
    pub review_error: Option<String>,
    #[serde(default)]
    pub reviewed: bool,
}

/// Purchase form data.
///
/// Number inputs submit an empty string when cleared; blank means default.
#[derive(Debug, Deserialize)]
pub struct BuyForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quantity: Option<u32>,
    pub shipping_address: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub points: Option<u64>,
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: String,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub header: HeaderView,
    pub category: Option<String>,
    pub categories: Section<CategoryView>,
    pub products: Section<ProductCardView>,
}

impl ProductsIndexTemplate {
    #[must_use]
    pub fn new(header: HeaderView, page: &ProductListPage) -> Self {
        let signed_in = header.signed_in;
        let active = page.category.as_deref();
        Self {
            category: page.category.clone(),
            categories: Section::from_fetched(&page.categories, |c| CategoryView::new(c, active)),
            products: Section::from_fetched(&page.products, |p| {
                ProductCardView::new(p, signed_in)
            }),
            header,
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub header: HeaderView,
    pub product: ProductDetailView,
    pub reviews: Section<ReviewView>,
    pub error: Option<String>,
    pub review_error: Option<String>,
    pub reviewed: bool,
    pub login_href: String,
}

/// Display product listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(query): Query<ListingQuery>) -> Response {
    let load = state.pages().products(query.category, query.limit);
    let header = state.header();

    match load.settled().await {
        LoadState::Ready(page) => ProductsIndexTemplate::new(header, &page).into_response(),
        other => super::unsettled(other, header, "/products"),
    }
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let load = state.pages().product(ProductId::new(id));
    let header = state.header();

    match load.settled().await {
        LoadState::Ready(page) => render_detail(header, page, query),
        other => super::unsettled(other, header, "/products"),
    }
}

fn render_detail(header: HeaderView, page: ProductDetailPage, query: DetailQuery) -> Response {
    let product = match page.product {
        Fetched::Loaded(product) => product,
        Fetched::Failed(err) if err.kind == FetchErrorKind::NotFound => {
            return (
                StatusCode::NOT_FOUND,
                super::NoticeTemplate::not_found(header, "This product could not be found."),
            )
                .into_response();
        }
        Fetched::Failed(err) => {
            return (
                StatusCode::BAD_GATEWAY,
                super::NoticeTemplate::unavailable(header, err.reason),
            )
                .into_response();
        }
    };

    let detail = ProductDetailView::new(&product, header.signed_in);
    ProductShowTemplate {
        login_href: super::login_href(&detail.card.href),
        reviews: Section::from_fetched(&page.reviews, |r| ReviewView::from(r)),
        product: detail,
        error: query.error,
        review_error: query.review_error,
        reviewed: query.reviewed,
        header,
    }
    .into_response()
}

/// Place a single-product order.
///
/// Without a session this redirects to login and returns to the product.
/// On success the cached profile is refreshed so the header shows the new
/// point balance.
#[instrument(skip(state, form))]
pub async fn buy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BuyForm>,
) -> Response {
    let product_path = format!("/products/{}", urlencoding::encode(&id));

    let Some(token) = state.session().token() else {
        return Redirect::to(&super::login_href(&product_path)).into_response();
    };

    let shipping_address = form.shipping_address.trim().to_string();
    if shipping_address.is_empty() {
        return redirect_with_error(&product_path, "Please enter a shipping address.");
    }

    let request = OrderRequest {
        items: vec![OrderLine {
            product_id: ProductId::new(id),
            quantity: form.quantity.unwrap_or(1).max(1),
        }],
        shipping_address,
        loyalty_points_to_use: form.points.unwrap_or(0),
    };

    match state.api().place_order(&token, &request).await {
        Ok(receipt) => {
            tracing::info!(
                order_id = %receipt.order_id,
                total = %receipt.total_amount,
                points_earned = receipt.loyalty_points_earned,
                "Order placed"
            );
            state.auth().refresh_profile().await;
            Redirect::to(&format!(
                "/orders?placed={}",
                urlencoding::encode(receipt.order_id.as_str())
            ))
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Order failed");
            redirect_with_error(&product_path, failure_message(&e, "Order failed"))
        }
    }
}

/// Submit a review for a product.
///
/// Requires a session. The API rejects a second review of the same product;
/// its reason is shown above the review form.
#[instrument(skip(state, form))]
pub async fn review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let product_path = format!("/products/{}", urlencoding::encode(&id));

    let Some(token) = state.session().token() else {
        return Redirect::to(&super::login_href(&product_path)).into_response();
    };

    let Some(rating) = form.rating.filter(|r| (1..=5).contains(r)) else {
        return redirect_with_review_error(&product_path, "Please choose a rating from 1 to 5.");
    };
    let comment = form.comment.trim().to_string();
    if comment.is_empty() {
        return redirect_with_review_error(&product_path, "Please write a comment.");
    }

    let request = ReviewRequest {
        product_id: ProductId::new(id),
        rating,
        comment,
    };

    match state.api().create_review(&token, &request).await {
        Ok(_) => {
            tracing::info!(product_id = %request.product_id, rating, "Review submitted");
            Redirect::to(&format!("{product_path}?reviewed=true")).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Review failed");
            redirect_with_review_error(&product_path, failure_message(&e, "Review failed"))
        }
    }
}

fn failure_message<'a>(err: &'a ApiError, fallback: &'a str) -> &'a str {
    if err.is_unauthorized() {
        crate::pages::SESSION_EXPIRED
    } else {
        err.detail().unwrap_or(fallback)
    }
}

fn redirect_with_error(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message))).into_response()
}

fn redirect_with_review_error(path: &str, message: &str) -> Response {
    Redirect::to(&format!(
        "{path}?review_error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}
