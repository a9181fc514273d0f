//! ElectroMart API client.
//!
//! # Architecture
//!
//! - The remote API is the source of truth - no local copies beyond the session
//! - Plain JSON over `reqwest`; every call is one request, no retries
//! - No caching: each page load fetches fresh data
//!
//! # Endpoints
//!
//! ## Public
//! - `POST /auth/login`, `POST /auth/register`
//! - `GET /products`, `GET /products/{id}`, `GET /products/{id}/reviews`
//! - `GET /categories`
//!
//! ## Bearer-authenticated
//! - `GET /loyalty/status`, `GET /orders`, `POST /orders`
//! - `GET /recommendations`, `POST /reviews`
//!
//! # Example
//!
//! ```rust,ignore
//! use electromart_storefront::api::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new(&config.api);
//! let products = client.products(&ProductQuery::limit(8)).await?;
//! ```

pub mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use electromart_core::{Category, LoyaltyStatus, Order, Product, ProductId, Review};

use crate::config::ApiConfig;

/// Errors that can occur when talking to the ElectroMart API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}{}", format_detail(.detail.as_deref()))]
    Status {
        status: StatusCode,
        /// The `detail` string from the error body, when there was one.
        detail: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot carry path segments.
    #[error("Invalid API base URL: {0}")]
    BaseUrl(String),
}

impl ApiError {
    /// The API's own explanation of the failure, if it gave one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True when the API rejected the bearer token (or the credentials).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// True when the requested resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

fn format_detail(detail: Option<&str>) -> String {
    detail.map_or_else(String::new, |d| format!(": {d}"))
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the ElectroMart REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_base_url(config.base_url.clone())
    }

    /// Create a client for an explicit base URL, e.g. `http://localhost:8001/api`.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
            }),
        }
    }

    /// The base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::BaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.get(self.endpoint(segments)?))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.post(self.endpoint(segments)?))
    }

    /// Send a request and decode a JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let detail = error_detail(&body);
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "ElectroMart API returned a server error"
                );
            } else {
                debug!(status = %status, detail = ?detail, "ElectroMart API rejected request");
            }
            return Err(ApiError::Status { status, detail });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse ElectroMart API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a token and profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (401 with a detail) for bad credentials, or
    /// a transport/parse error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.execute(self.post(&["auth", "login"])?.json(request))
            .await
    }

    /// Create an account and receive a token and profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (400 with a detail) when the email is taken,
    /// or a transport/parse error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<AuthResponse, ApiError> {
        self.execute(self.post(&["auth", "register"])?.json(request))
            .await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List active products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        self.execute(self.get(&["products"])?.query(query)).await
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns an error for which [`ApiError::is_not_found`] holds when the
    /// product does not exist or is inactive.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.execute(self.get(&["products", id.as_str()])?).await
    }

    /// Reviews for a product, newest first as the API orders them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_reviews(&self, id: &ProductId, limit: u32) -> Result<Vec<Review>, ApiError> {
        self.execute(
            self.get(&["products", id.as_str(), "reviews"])?
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.execute(self.get(&["categories"])?).await
    }

    // =========================================================================
    // Account (bearer-authenticated)
    // =========================================================================

    /// Loyalty standing of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error for which [`ApiError::is_unauthorized`] holds when the
    /// token is missing, invalid or expired.
    #[instrument(skip(self, token))]
    pub async fn loyalty_status(&self, token: &SecretString) -> Result<LoyaltyStatus, ApiError> {
        self.execute(
            self.get(&["loyalty", "status"])?
                .bearer_auth(token.expose_secret()),
        )
        .await
    }

    /// Order history of the token's owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        self.execute(self.get(&["orders"])?.bearer_auth(token.expose_secret()))
            .await
    }

    /// Products recommended from the token owner's purchase history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn recommendations(
        &self,
        token: &SecretString,
        limit: u32,
    ) -> Result<Vec<Product>, ApiError> {
        self.execute(
            self.get(&["recommendations"])?
                .bearer_auth(token.expose_secret())
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with a detail for unknown products or
    /// insufficient stock, or a transport/parse error.
    #[instrument(skip(self, token, request), fields(lines = request.items.len()))]
    pub async fn place_order(
        &self,
        token: &SecretString,
        request: &OrderRequest,
    ) -> Result<OrderReceipt, ApiError> {
        self.execute(
            self.post(&["orders"])?
                .bearer_auth(token.expose_secret())
                .json(request),
        )
        .await
    }

    /// Submit a review as the token owner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with a detail when the product is unknown
    /// (404) or the user already reviewed it (400), or a transport/parse
    /// error.
    #[instrument(skip(self, token, request), fields(product_id = %request.product_id))]
    pub async fn create_review(
        &self,
        token: &SecretString,
        request: &ReviewRequest,
    ) -> Result<ReviewReceipt, ApiError> {
        self.execute(
            self.post(&["reviews"])?
                .bearer_auth(token.expose_secret())
                .json(request),
        )
        .await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Fetch the API greeting. Used as a readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    pub async fn greeting(&self) -> Result<ApiGreeting, ApiError> {
        self.execute(self.get(&[])?).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_base_url(Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let api = client("http://localhost:8001/api");
        assert_eq!(
            api.endpoint(&["auth", "login"]).unwrap().as_str(),
            "http://localhost:8001/api/auth/login"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let api = client("http://localhost:8001/api/");
        assert_eq!(
            api.endpoint(&["products"]).unwrap().as_str(),
            "http://localhost:8001/api/products"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("http://localhost:8001/api");
        assert_eq!(
            api.endpoint(&["products", "a/b c"]).unwrap().as_str(),
            "http://localhost:8001/api/products/a%2Fb%20c"
        );
    }

    #[test]
    fn test_endpoint_root() {
        let api = client("http://localhost:8001/api/");
        assert_eq!(
            api.endpoint(&[]).unwrap().as_str(),
            "http://localhost:8001/api"
        );
    }

    #[test]
    fn test_status_error_display_and_detail() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            detail: Some("Invalid credentials".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "API returned 401 Unauthorized: Invalid credentials"
        );
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert!(err.is_unauthorized());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_status_error_without_detail() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            detail: None,
        };
        assert_eq!(err.to_string(), "API returned 404 Not Found");
        assert!(err.is_not_found());
    }
}
