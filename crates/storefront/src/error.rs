//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Few handlers need it: a failed read on a page
//! only degrades the section it feeds.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use electromart_core::UserProfile;

use crate::api::ApiError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// ElectroMart API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error points at a fault on our side or upstream, as
    /// opposed to a missing resource or an expired session.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Api(err) => !err.is_not_found() && !err.is_unauthorized(),
        }
    }

    /// Capture server errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Api(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Api(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Api(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Api(err) => err
                .detail()
                .map_or_else(|| "ElectroMart API unavailable".to_string(), str::to_string),
        };

        (self.status(), message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in customer.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user: &UserProfile) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.clone()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
