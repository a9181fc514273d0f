//! Integration tests for the ElectroMart storefront.
//!
//! The storefront talks to a real HTTP server: [`StubApi`] serves a small,
//! fixed catalog and two accounts on a random loopback port, counting the
//! requests each endpoint receives so tests can assert what was (and was
//! not) fetched.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p electromart-integration-tests
//! ```
//!
//! # Stub accounts
//!
//! - `a@x.com` / `pw` - token `t1`, bronze, 0 points
//! - `taken@x.com` - already registered; registration fails
//!
//! `a@x.com` may review each product once; submitted reviews are listed
//! after the fixture reviews.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use electromart_storefront::api::ApiClient;
use electromart_storefront::config::StorefrontConfig;

/// Token the stub issues for the `a@x.com` account.
pub const TOKEN: &str = "t1";
/// Email of the stub's signed-up account.
pub const EMAIL: &str = "a@x.com";
/// Password of the stub's signed-up account.
pub const PASSWORD: &str = "pw";

/// An API base URL nothing listens on.
#[must_use]
pub fn unreachable_base_url() -> Url {
    Url::parse("http://127.0.0.1:9/api").unwrap_or_else(|e| panic!("static url: {e}"))
}

/// Per-endpoint request counters.
#[derive(Debug, Default)]
pub struct Hits {
    pub login: AtomicUsize,
    pub register: AtomicUsize,
    pub products: AtomicUsize,
    pub product: AtomicUsize,
    pub reviews: AtomicUsize,
    pub categories: AtomicUsize,
    pub loyalty: AtomicUsize,
    pub orders: AtomicUsize,
    pub place_order: AtomicUsize,
    pub recommendations: AtomicUsize,
    pub create_review: AtomicUsize,
}

impl Hits {
    /// Requests that needed a bearer token.
    #[must_use]
    pub fn authenticated(&self) -> usize {
        [
            &self.loyalty,
            &self.orders,
            &self.place_order,
            &self.recommendations,
            &self.create_review,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }

    /// Every request the stub received.
    #[must_use]
    pub fn total(&self) -> usize {
        self.authenticated()
            + [
                &self.login,
                &self.register,
                &self.products,
                &self.product,
                &self.reviews,
                &self.categories,
            ]
            .iter()
            .map(|counter| counter.load(Ordering::SeqCst))
            .sum::<usize>()
    }
}

/// Switches that make individual endpoints fail with a 500.
#[derive(Debug, Default)]
pub struct Faults {
    pub categories: AtomicBool,
    pub loyalty: AtomicBool,
    pub reviews: AtomicBool,
    /// Delay the loyalty response by [`SLOW_RESPONSE`] instead of failing.
    pub slow_loyalty: AtomicBool,
}

/// How long a slowed endpoint waits before answering.
pub const SLOW_RESPONSE: Duration = Duration::from_millis(300);

#[derive(Debug, Default)]
struct StubState {
    hits: Hits,
    faults: Faults,
    /// Points reported by the loyalty endpoint; placing an order adds 450.
    points: AtomicUsize,
    /// Query string of the most recent product listing request.
    products_query: Mutex<Option<HashMap<String, String>>>,
    /// Reviews submitted through `POST /reviews`.
    submitted: Mutex<Vec<Value>>,
}

/// A running stub of the ElectroMart API.
pub struct StubApi {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubApi {
    /// Bind to a random loopback port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind stub api: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("stub api has no address: {e}"));

        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL to hand to the storefront, ending in `/api`.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr))
            .unwrap_or_else(|e| panic!("stub url: {e}"))
    }

    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::with_base_url(self.base_url())
    }

    /// Storefront configuration pointing at this stub, storing the session
    /// under `data_dir`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    pub fn config(&self, data_dir: &std::path::Path) -> StorefrontConfig {
        let api_url = self.base_url().to_string();
        let data_dir = data_dir.display().to_string();
        StorefrontConfig::from_lookup(|key| match key {
            "ELECTROMART_API_URL" => Some(api_url.clone()),
            "STOREFRONT_DATA_DIR" => Some(data_dir.clone()),
            "STOREFRONT_PORT" => Some("0".to_string()),
            _ => None,
        })
        .unwrap_or_else(|e| panic!("stub config: {e}"))
    }

    #[must_use]
    pub fn hits(&self) -> &Hits {
        &self.state.hits
    }

    #[must_use]
    pub fn faults(&self) -> &Faults {
        &self.state.faults
    }

    /// Query parameters of the last `GET /products`, if any arrived.
    #[must_use]
    pub fn last_products_query(&self) -> Option<HashMap<String, String>> {
        self.state
            .products_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api", get(greeting))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/products", get(products))
        .route("/api/products/{id}", get(product))
        .route("/api/products/{id}/reviews", get(reviews))
        .route("/api/categories", get(categories))
        .route("/api/loyalty/status", get(loyalty_status))
        .route("/api/orders", get(orders).post(place_order))
        .route("/api/recommendations", get(recommendations))
        .route("/api/reviews", post(create_review))
        .with_state(state)
}

// =============================================================================
// Fixtures
// =============================================================================

fn user(points: usize) -> Value {
    let tier = if points >= 500 { "silver" } else { "bronze" };
    json!({
        "id": "u1",
        "name": "Asha Rao",
        "email": EMAIL,
        "phone": null,
        "loyalty_points": points,
        "loyalty_tier": tier,
    })
}

fn product_json(id: &str) -> Option<Value> {
    match id {
        "p1" => Some(json!({
            "id": "p1",
            "name": "Apple MacBook Air M2",
            "description": "13-inch laptop with the M2 chip",
            "brand": "Apple",
            "price": 45000,
            "category": "Laptops",
            "image_url": "https://img.example/p1.jpg",
            "specifications": {"battery_life": "18 hours"},
            "stock_quantity": 0,
            "warranty_months": 12,
            "rating": 4.8,
            "review_count": 1,
        })),
        "p2" => Some(json!({
            "id": "p2",
            "name": "Sony WH-1000XM5",
            "description": "Noise cancelling headphones",
            "brand": "Sony",
            "price": 29990,
            "category": "Headphones",
            "image_url": "https://img.example/p2.jpg",
            "stock_quantity": 25,
            "warranty_months": 12,
            "rating": 4.6,
            "review_count": 0,
        })),
        _ => None,
    }
}

fn detail(message: &str) -> Json<Value> {
    Json(json!({ "detail": message }))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, detail("Invalid token")).into_response()
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, detail("Internal error")).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

async fn greeting() -> Json<Value> {
    Json(json!({ "message": "ElectroMart API" }))
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(state): State<Arc<StubState>>, Json(body): Json<Credentials>) -> Response {
    state.hits.login.fetch_add(1, Ordering::SeqCst);
    if body.email == EMAIL && body.password == PASSWORD {
        let points = state.points.load(Ordering::SeqCst);
        Json(json!({ "token": TOKEN, "user": user(points), "message": "Login successful" }))
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, detail("Invalid credentials")).into_response()
    }
}

#[derive(Deserialize)]
struct NewAccount {
    name: String,
    email: String,
    phone: Option<String>,
}

async fn register(State(state): State<Arc<StubState>>, Json(body): Json<NewAccount>) -> Response {
    state.hits.register.fetch_add(1, Ordering::SeqCst);
    if body.email == "taken@x.com" {
        return (StatusCode::BAD_REQUEST, detail("User already exists")).into_response();
    }
    Json(json!({
        "token": "t2",
        "user": {
            "id": "u2",
            "name": body.name,
            "email": body.email,
            "phone": body.phone,
            "loyalty_points": 100,
            "loyalty_tier": "bronze",
        },
    }))
    .into_response()
}

async fn products(
    State(state): State<Arc<StubState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.hits.products.fetch_add(1, Ordering::SeqCst);
    let limit = query
        .get("limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let listed: Vec<Value> = ["p1", "p2"]
        .into_iter()
        .filter_map(product_json)
        .filter(|product| {
            query
                .get("category")
                .is_none_or(|category| product["category"] == category.as_str())
        })
        .take(limit)
        .collect();
    *state
        .products_query
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some(query);
    Json(Value::Array(listed))
}

async fn product(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    state.hits.product.fetch_add(1, Ordering::SeqCst);
    match product_json(&id) {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, detail("Product not found")).into_response(),
    }
}

async fn reviews(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    state.hits.reviews.fetch_add(1, Ordering::SeqCst);
    if state.faults.reviews.load(Ordering::SeqCst) {
        return server_error();
    }
    let mut reviews = if id == "p1" {
        vec![json!({
            "id": "r1",
            "product_id": "p1",
            "user_id": "u9",
            "rating": 5,
            "comment": "Fast and silent",
            "created_at": "2024-02-10T08:00:00",
        })]
    } else {
        Vec::new()
    };
    reviews.extend(
        state
            .submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|review| review["product_id"] == id.as_str())
            .cloned(),
    );
    Json(Value::Array(reviews)).into_response()
}

async fn categories(State(state): State<Arc<StubState>>) -> Response {
    state.hits.categories.fetch_add(1, Ordering::SeqCst);
    if state.faults.categories.load(Ordering::SeqCst) {
        return server_error();
    }
    Json(json!([
        {"id": "c1", "name": "Laptops", "description": "Portable computers"},
        {"id": "c2", "name": "Headphones", "description": "Wired and wireless audio"},
    ]))
    .into_response()
}

async fn loyalty_status(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.hits.loyalty.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if state.faults.loyalty.load(Ordering::SeqCst) {
        return server_error();
    }
    if state.faults.slow_loyalty.load(Ordering::SeqCst) {
        tokio::time::sleep(SLOW_RESPONSE).await;
    }
    let points = state.points.load(Ordering::SeqCst);
    Json(json!({
        "tier": if points >= 500 { "silver" } else { "bronze" },
        "points": points,
        "total_spent": 0,
        "benefits": {
            "bronze": {"discount": "0%"},
            "silver": {"discount": "5%", "free_shipping": true},
        },
    }))
    .into_response()
}

async fn orders(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.hits.orders.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([{
        "id": "o1",
        "created_at": "2024-03-01T10:15:30",
        "order_status": "delivered",
        "total_amount": 29990,
        "loyalty_points_earned": 299,
        "payment_status": "completed",
        "items": [{
            "product_id": "p2",
            "name": "Sony WH-1000XM5",
            "price": 29990,
            "quantity": 1,
            "total": 29990,
        }],
    }]))
    .into_response()
}

#[derive(Deserialize)]
struct NewOrder {
    items: Vec<NewOrderLine>,
}

#[derive(Deserialize)]
struct NewOrderLine {
    product_id: String,
}

async fn place_order(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<NewOrder>,
) -> Response {
    state.hits.place_order.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if body.items.iter().any(|line| line.product_id == "p1") {
        return (
            StatusCode::BAD_REQUEST,
            detail("Insufficient stock for Apple MacBook Air M2"),
        )
            .into_response();
    }
    let points = state.points.fetch_add(450, Ordering::SeqCst) + 450;
    Json(json!({
        "order_id": "o2",
        "total_amount": 29990,
        "loyalty_points_earned": 450,
        "new_loyalty_points": points,
        "new_tier": if points >= 500 { "silver" } else { "bronze" },
    }))
    .into_response()
}

async fn recommendations(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.hits.recommendations.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([product_json("p2")])).into_response()
}

#[derive(Deserialize)]
struct NewReview {
    product_id: String,
    rating: u8,
    comment: String,
}

async fn create_review(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<NewReview>,
) -> Response {
    state.hits.create_review.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if product_json(&body.product_id).is_none() {
        return (StatusCode::NOT_FOUND, detail("Product not found")).into_response();
    }
    let mut submitted = state
        .submitted
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if submitted
        .iter()
        .any(|review| review["product_id"] == body.product_id.as_str())
    {
        return (
            StatusCode::BAD_REQUEST,
            detail("You have already reviewed this product"),
        )
            .into_response();
    }
    let next_id = submitted.len() + 2;
    submitted.push(json!({
        "id": format!("r{}", next_id),
        "product_id": body.product_id,
        "user_id": "u1",
        "rating": body.rating,
        "comment": body.comment,
        "created_at": "2024-04-01T09:00:00",
    }));
    Json(json!({ "message": "Review created successfully" })).into_response()
}
