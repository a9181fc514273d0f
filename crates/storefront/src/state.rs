//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::pages::PageLoader;
use crate::session::{AuthManager, SessionContext, SessionStore};
use crate::views::HeaderView;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// API client, the session and the page loaders.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    auth: AuthManager,
    session: SessionContext,
    pages: PageLoader,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Any session persisted in `store` is restored before this returns.
    #[must_use]
    pub fn new(config: StorefrontConfig, store: SessionStore) -> Self {
        let api = ApiClient::new(&config.api);
        let auth = AuthManager::new(api.clone(), store);
        let session = auth.context();
        let pages = PageLoader::new(api.clone(), session.clone(), config.limits);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                auth,
                session,
                pages,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the ElectroMart API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The session owner. Handlers call this to log in or out.
    #[must_use]
    pub fn auth(&self) -> &AuthManager {
        &self.inner.auth
    }

    /// Read-only view of the current session.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    #[must_use]
    pub fn pages(&self) -> &PageLoader {
        &self.inner.pages
    }

    /// Header for the current session.
    #[must_use]
    pub fn header(&self) -> HeaderView {
        HeaderView::new(self.session().user().as_ref())
    }
}
