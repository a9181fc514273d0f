//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness
//! GET  /health/ready           - ElectroMart API reachability
//!
//! # Catalog
//! GET  /products               - Product listing (?category=&limit=)
//! GET  /products/{id}          - Product detail with reviews
//! POST /products/{id}/buy      - Place a one-item order (requires session)
//! POST /products/{id}/reviews  - Submit a review (requires session)
//! GET  /categories             - Category listing
//!
//! # Account (requires session)
//! GET  /loyalty                - Loyalty status and recent orders
//! GET  /orders                 - Order history
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! POST /auth/refresh           - Refetch points and tier
//! ```

pub mod account;
pub mod auth;
pub mod categories;
pub mod home;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware;
use crate::pages::LoadState;
use crate::state::AppState;
use crate::views::HeaderView;

// =============================================================================
// Shared templates
// =============================================================================

/// Full-page message: login prompt, not found, load failure.
#[derive(Template, WebTemplate)]
#[template(path = "notice.html")]
pub struct NoticeTemplate {
    pub header: HeaderView,
    pub title: String,
    pub message: String,
    pub show_login: bool,
    pub login_href: String,
}

impl NoticeTemplate {
    /// Prompt to log in, returning to `next` afterwards.
    #[must_use]
    pub fn login_required(header: HeaderView, next: &str) -> Self {
        Self {
            header,
            title: "Please log in".to_string(),
            message: "Log in to see your loyalty points and orders.".to_string(),
            show_login: true,
            login_href: login_href(next),
        }
    }

    #[must_use]
    pub fn not_found(header: HeaderView, message: impl Into<String>) -> Self {
        Self {
            header,
            title: "Not found".to_string(),
            message: message.into(),
            show_login: false,
            login_href: login_href("/"),
        }
    }

    #[must_use]
    pub fn unavailable(header: HeaderView, message: impl Into<String>) -> Self {
        Self {
            header,
            title: "Something went wrong".to_string(),
            message: message.into(),
            show_login: false,
            login_href: login_href("/"),
        }
    }
}

/// Render a load that did not reach `Ready`.
///
/// `next` is where a login prompt should send the user back to.
pub(crate) fn unsettled<T>(state: LoadState<T>, header: HeaderView, next: &str) -> Response {
    match state {
        LoadState::LoginRequired => NoticeTemplate::login_required(header, next).into_response(),
        LoadState::Failed(reason) => {
            AppError::Internal(format!("{next}: {reason}")).report();
            (
                StatusCode::SERVICE_UNAVAILABLE,
                NoticeTemplate::unavailable(header, reason),
            )
                .into_response()
        }
        LoadState::Pending | LoadState::Ready(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            NoticeTemplate::unavailable(header, "The page is still loading. Please try again."),
        )
            .into_response(),
    }
}

/// Login page link that returns to `next`.
#[must_use]
pub fn login_href(next: &str) -> String {
    format!("/auth/login?next={}", urlencoding::encode(&safe_next(Some(next))))
}

/// Restrict post-login redirects to local paths.
#[must_use]
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/buy", post(products::buy))
        .route("/{id}/reviews", post(products::review))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        .route("/categories", get(categories::index))
        // Account
        .route("/loyalty", get(account::loyalty))
        .route("/orders", get(account::orders))
        // Auth
        .nest("/auth", auth_routes())
}

/// The full application with health checks and the middleware stack.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = Empty,
            user_id = Empty,
            tier = Empty,
        )
    });

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(
            ServiceBuilder::new()
                .layer(trace)
                .layer(from_fn(middleware::request_id_middleware))
                .layer(from_fn_with_state(
                    state.clone(),
                    middleware::session_context_middleware,
                ))
                .layer(from_fn(middleware::security_headers_middleware)),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the ElectroMart API is not reachable.
async fn readiness(State(state): State<AppState>) -> Result<&'static str> {
    state.api().greeting().await?;
    Ok("ready")
}
