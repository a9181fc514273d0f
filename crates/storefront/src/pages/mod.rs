//! Per-page data loading.
//!
//! Each page load runs as a [`LoadTask`]: spawned on the runtime, it issues
//! the page's reads (joined when there are several), records each outcome as
//! a [`Fetched`] and settles into [`LoadState::Ready`]. A failed read only
//! empties its own section; the page still renders.
//!
//! Nothing is cached. Loading the same page twice calls the API twice.
//!
//! ```rust,ignore
//! let task = state.pages().home();
//! match task.settled().await {
//!     LoadState::Ready(home) => { /* render */ }
//!     LoadState::LoginRequired => { /* prompt */ }
//!     _ => {}
//! }
//! ```

pub mod account;
pub mod catalog;
pub mod home;

pub use account::{LoyaltyPage, OrdersPage};
pub use catalog::{CategoriesPage, ProductDetailPage, ProductListPage};
pub use home::HomePage;

use std::future::Future;

use tokio::sync::watch;
use tracing::warn;

use crate::api::{ApiClient, ApiError};
use crate::config::PageLimits;
use crate::session::SessionContext;

/// Shown when an authenticated read is rejected.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

// =============================================================================
// Fetch outcome
// =============================================================================

/// Why a single read produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The resource does not exist.
    NotFound,
    /// The API rejected the bearer token.
    SessionExpired,
    /// Transport failure, server error or unexpected response.
    Unavailable,
}

/// A failed read, with a reason fit for the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub reason: String,
}

/// Outcome of one read on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Loaded(T),
    Failed(FetchError),
}

impl<T> Fetched<T> {
    /// Record a read, logging the failure if there was one.
    pub(crate) fn from_result(result: Result<T, ApiError>, what: &str) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(e) => {
                let (kind, reason) = if e.is_unauthorized() {
                    (FetchErrorKind::SessionExpired, SESSION_EXPIRED.to_string())
                } else if e.is_not_found() {
                    (FetchErrorKind::NotFound, format!("The requested {what} was not found."))
                } else {
                    (
                        FetchErrorKind::Unavailable,
                        format!("Unable to load {what} right now."),
                    )
                };
                warn!(error = %e, what, ?kind, "Page read failed");
                Self::Failed(FetchError { kind, reason })
            }
        }
    }

    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Loaded(_) => None,
            Self::Failed(err) => Some(err),
        }
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    #[must_use]
    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Failed(_) => None,
        }
    }
}

impl<T: Default> Fetched<T> {
    /// The data, or an empty value for a failed read.
    #[must_use]
    pub fn into_loaded_or_default(self) -> T {
        self.into_loaded().unwrap_or_default()
    }
}

// =============================================================================
// Load state
// =============================================================================

/// Lifecycle of one page load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// Reads are in flight.
    Pending,
    /// The page needs a session and there is none. No read was issued.
    LoginRequired,
    /// All reads settled. Individual sections may still have failed.
    Ready(T),
    /// The load itself was lost before settling.
    Failed(String),
}

impl<T> LoadState<T> {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A page load running in the background.
///
/// Dropping the handle does not stop the reads; their result is discarded.
#[derive(Debug)]
pub struct LoadTask<T> {
    rx: watch::Receiver<LoadState<T>>,
}

impl<T> LoadTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawn a load on the current runtime.
    pub fn spawn<F>(load: F) -> Self
    where
        F: Future<Output = LoadState<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(LoadState::Pending);
        tokio::spawn(async move {
            let state = load.await;
            tx.send_replace(state);
        });
        Self { rx }
    }

    /// The state right now.
    #[must_use]
    pub fn state(&self) -> LoadState<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the load to leave `Pending`.
    pub async fn settled(mut self) -> LoadState<T> {
        match self.rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => (*state).clone(),
            Err(_) => LoadState::Failed("The page could not be loaded.".to_string()),
        }
    }
}

// =============================================================================
// PageLoader
// =============================================================================

/// Starts page loads against the API, using the shared session for the
/// pages that need a token.
#[derive(Debug, Clone)]
pub struct PageLoader {
    api: ApiClient,
    session: SessionContext,
    limits: PageLimits,
}

impl PageLoader {
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionContext, limits: PageLimits) -> Self {
        Self {
            api,
            session,
            limits,
        }
    }

    #[must_use]
    pub const fn limits(&self) -> &PageLimits {
        &self.limits
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    fn status(code: StatusCode) -> ApiError {
        ApiError::Status {
            status: code,
            detail: None,
        }
    }

    #[test]
    fn test_fetched_classifies_failures() {
        let expired: Fetched<()> =
            Fetched::from_result(Err(status(StatusCode::UNAUTHORIZED)), "orders");
        let err = expired.error().unwrap();
        assert_eq!(err.kind, FetchErrorKind::SessionExpired);
        assert_eq!(err.reason, SESSION_EXPIRED);

        let missing: Fetched<()> =
            Fetched::from_result(Err(status(StatusCode::NOT_FOUND)), "product");
        assert_eq!(missing.error().unwrap().kind, FetchErrorKind::NotFound);

        let down: Fetched<()> =
            Fetched::from_result(Err(status(StatusCode::INTERNAL_SERVER_ERROR)), "categories");
        assert_eq!(down.error().unwrap().kind, FetchErrorKind::Unavailable);
        assert_eq!(down.error().unwrap().reason, "Unable to load categories right now.");
    }

    #[test]
    fn test_failed_read_degrades_to_empty() {
        let failed: Fetched<Vec<u32>> =
            Fetched::from_result(Err(status(StatusCode::BAD_GATEWAY)), "products");
        assert!(!failed.is_loaded());
        assert!(failed.into_loaded_or_default().is_empty());

        let loaded: Fetched<Vec<u32>> = Fetched::from_result(Ok(vec![1, 2]), "products");
        assert_eq!(loaded.loaded(), Some(&vec![1, 2]));
    }

    #[tokio::test]
    async fn test_load_task_settles() {
        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let task = LoadTask::spawn(async move {
            let _ = wait.await;
            LoadState::Ready(42_u32)
        });

        assert!(task.state().is_pending());
        release.send(()).unwrap();
        assert_eq!(task.settled().await, LoadState::Ready(42));
    }

    #[tokio::test]
    async fn test_load_task_lost_before_settling() {
        let task: LoadTask<u32> = LoadTask::spawn(async {
            let aborted: Option<u32> = None;
            LoadState::Ready(aborted.expect("load aborted"))
        });
        assert!(matches!(task.settled().await, LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn test_dropped_task_does_not_cancel_the_load() {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let task = LoadTask::spawn(async move {
            let _ = done_tx.send(());
            LoadState::Ready(())
        });
        drop(task);
        assert!(done_rx.await.is_ok());
    }
}
