//! Command implementations.

pub mod account;
pub mod auth;

use electromart_storefront::api::ApiClient;
use electromart_storefront::config::{ConfigError, StorefrontConfig};
use electromart_storefront::pages::PageLoader;
use electromart_storefront::session::{AuthFailure, AuthManager, SessionStore, StoreError};
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Auth(#[from] AuthFailure),

    /// The command needs a session.
    #[error("Not signed in. Run `em-cli login` first.")]
    NotSignedIn,

    /// A read failed.
    #[error("{0}")]
    Unavailable(String),
}

/// What every command works with: the shared session and page loaders.
pub struct Context {
    pub auth: AuthManager,
    pub pages: PageLoader,
}

impl Context {
    /// Load configuration and restore the stored session.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the configuration is invalid or the data
    /// directory cannot be created.
    pub fn open() -> Result<Self, CliError> {
        let config = StorefrontConfig::from_env()?;
        let store = SessionStore::open(&config.data_dir)?;
        let api = ApiClient::new(&config.api);
        let auth = AuthManager::new(api.clone(), store);
        let pages = PageLoader::new(api, auth.context(), config.limits);

        tracing::debug!(data_dir = %config.data_dir.display(), "Session store opened");
        Ok(Self { auth, pages })
    }
}
