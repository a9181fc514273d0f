//! Login, registration and logout.
//!
//! [`AuthManager`] is the only component that writes the session. It keeps
//! the persisted copy ([`SessionStore`]) and the published copy
//! ([`SessionContext`]) in step:
//!
//! - success: store first, then publish
//! - failure: neither is touched, the previous session stays
//! - logout: both cleared, whatever the store says
//!
//! Every write to the pair happens under one lock, so a logout cannot land
//! between a refresh's session check and its save.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use electromart_core::{Email, UserProfile};

use super::context::{Session, SessionContext};
use super::store::SessionStore;
use crate::api::{ApiClient, ApiError, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{clear_sentry_user, set_sentry_user};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Why a login or registration did not produce a session.
///
/// The reason is safe to show on the form as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct AuthFailure {
    pub reason: String,
}

impl AuthFailure {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Use the API's `detail` when it sent one, otherwise the fallback.
    fn from_api(err: &ApiError, fallback: &str) -> Self {
        Self::new(err.detail().unwrap_or(fallback))
    }
}

/// Fields of the registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    /// Blank input is sent as absent.
    pub phone: Option<String>,
}

/// Owns the session: the single writer of both store and context.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AuthManager {
    inner: Arc<AuthManagerInner>,
}

struct AuthManagerInner {
    api: ApiClient,
    store: SessionStore,
    tx: watch::Sender<Option<Session>>,
    /// Held across each store-and-publish step, never across an await.
    writes: Mutex<()>,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("authenticated", &self.inner.tx.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create the manager and restore any persisted session.
    ///
    /// Restoration never contacts the API.
    #[must_use]
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        let (tx, _rx) = watch::channel(None);
        let manager = Self {
            inner: Arc::new(AuthManagerInner {
                api,
                store,
                tx,
                writes: Mutex::new(()),
            }),
        };
        manager.restore();
        manager
    }

    /// A read handle on the session.
    #[must_use]
    pub fn context(&self) -> SessionContext {
        SessionContext::new(self.inner.tx.subscribe())
    }

    /// Re-read the persisted session and publish it. Idempotent.
    pub fn restore(&self) -> Option<UserProfile> {
        let _writing = self.write_lock();
        let session = self.inner.store.load();
        let user = session.as_ref().map(|s| s.user().clone());
        if let Some(user) = &user {
            info!(user_id = %user.id, "Restored persisted session");
            set_sentry_user(user);
        }
        self.inner.tx.send_replace(session);
        user
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailure` with the API's detail (e.g. "Invalid
    /// credentials") or "Login failed". The current session is unchanged.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserProfile, AuthFailure> {
        let email = Email::parse(email).map_err(|e| AuthFailure::new(e.to_string()))?;

        let request = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response = self.inner.api.login(&request).await.map_err(|e| {
            warn!(error = %e, "Login failed");
            AuthFailure::from_api(&e, LOGIN_FAILED)
        })?;

        self.establish(response, LOGIN_FAILED)
    }

    /// Create an account and sign in to it.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailure` with the API's detail (e.g. "User already
    /// exists") or "Registration failed". The current session is unchanged.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, AuthFailure> {
        let email =
            Email::parse(&registration.email).map_err(|e| AuthFailure::new(e.to_string()))?;
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(AuthFailure::new("Name is required"));
        }

        let request = RegisterRequest {
            name,
            email: email.as_str(),
            password: registration.password.expose_secret(),
            phone: registration
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty()),
        };
        let response = self.inner.api.register(&request).await.map_err(|e| {
            warn!(error = %e, "Registration failed");
            AuthFailure::from_api(&e, REGISTRATION_FAILED)
        })?;

        self.establish(response, REGISTRATION_FAILED)
    }

    /// Sign out locally. Always leaves store and context empty.
    pub fn logout(&self) {
        let _writing = self.write_lock();
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        if let Some(previous) = self.inner.tx.send_replace(None) {
            info!(user_id = %previous.user().id, "Signed out");
        }
        clear_sentry_user();
    }

    /// Refetch loyalty points and tier for the signed-in user.
    ///
    /// Returns the updated profile, or `None` when signed out or the fetch
    /// failed. A failure is logged and leaves the session as it was.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Option<UserProfile> {
        let session = self.inner.tx.borrow().clone()?;

        let status = match self.inner.api.loyalty_status(session.token()).await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Failed to refresh profile");
                return None;
            }
        };

        let user = session.user().with_loyalty(status.points, status.tier);
        let updated = session.with_user(user.clone());

        // Logout or a new login may have happened while the request was out.
        let _writing = self.write_lock();
        let unchanged = self.inner.tx.borrow().as_ref().is_some_and(|current| {
            current.token().expose_secret() == session.token().expose_secret()
        });
        if !unchanged {
            return None;
        }

        if let Err(e) = self.inner.store.save(&updated) {
            warn!(error = %e, "Failed to persist refreshed profile");
            return None;
        }
        self.inner.tx.send_replace(Some(updated));
        Some(user)
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.inner
            .writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn establish(
        &self,
        response: AuthResponse,
        fallback: &str,
    ) -> Result<UserProfile, AuthFailure> {
        let AuthResponse { token, user, .. } = response;
        if token.is_empty() {
            warn!("API returned an empty token");
            return Err(AuthFailure::new(fallback));
        }

        let session = Session::new(SecretString::from(token), user.clone());
        let _writing = self.write_lock();
        self.inner.store.save(&session).map_err(|e| {
            warn!(error = %e, "Failed to persist session");
            AuthFailure::new(fallback)
        })?;
        self.inner.tx.send_replace(Some(session));

        info!(user_id = %user.id, "Signed in");
        set_sentry_user(&user);
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    use electromart_core::{LoyaltyTier, UserId};
    use url::Url;

    use super::*;
    use crate::session::store::{KeyValueStore, MemoryStore, keys};

    fn unreachable_api() -> ApiClient {
        // Port 9 (discard) on loopback refuses connections.
        ApiClient::with_base_url(Url::parse("http://127.0.0.1:9/api").unwrap())
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("u1"),
            name: "Asha Rao".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            loyalty_points: 120,
            loyalty_tier: LoyaltyTier::Silver,
        }
    }

    fn seeded_store() -> (Arc<MemoryStore>, SessionStore) {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::TOKEN, "t1").unwrap();
        backend
            .set(keys::USER, &serde_json::to_string(&profile()).unwrap())
            .unwrap();
        let store = SessionStore::new(backend.clone());
        (backend, store)
    }

    #[test]
    fn test_auth_failure_uses_detail_or_fallback() {
        let with_detail = ApiError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            detail: Some("Invalid credentials".to_string()),
        };
        assert_eq!(
            AuthFailure::from_api(&with_detail, LOGIN_FAILED).reason,
            "Invalid credentials"
        );

        let without = ApiError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            detail: None,
        };
        assert_eq!(
            AuthFailure::from_api(&without, REGISTRATION_FAILED).to_string(),
            "Registration failed"
        );
    }

    #[tokio::test]
    async fn test_new_restores_persisted_session() {
        let (_backend, store) = seeded_store();
        let auth = AuthManager::new(unreachable_api(), store);

        let context = auth.context();
        assert_eq!(context.user().unwrap(), profile());
        assert_eq!(context.token().unwrap().expose_secret(), "t1");

        // Idempotent
        assert_eq!(auth.restore(), Some(profile()));
        assert_eq!(auth.restore(), Some(profile()));
        assert_eq!(context.user().unwrap(), profile());
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_context() {
        let (backend, store) = seeded_store();
        let auth = AuthManager::new(unreachable_api(), store);
        let context = auth.context();

        auth.logout();
        assert!(!context.is_authenticated());
        assert!(backend.is_empty());

        // Logging out twice is harmless
        auth.logout();
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_network_failure_is_generic_and_keeps_session() {
        let (backend, store) = seeded_store();
        let auth = AuthManager::new(unreachable_api(), store);

        let err = auth
            .login("b@x.com", &SecretString::from("pw"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, "Login failed");

        assert_eq!(auth.context().user().unwrap(), profile());
        assert_eq!(backend.get(keys::TOKEN).unwrap().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_malformed_email_fails_before_network() {
        let auth = AuthManager::new(unreachable_api(), SessionStore::in_memory());

        let err = auth
            .login("not-an-email", &SecretString::from("pw"))
            .await
            .unwrap_err();
        assert_ne!(err.reason, "Login failed");
        assert!(!auth.context().is_authenticated());
    }

    #[tokio::test]
    async fn test_register_requires_name() {
        let auth = AuthManager::new(unreachable_api(), SessionStore::in_memory());
        let registration = Registration {
            name: "   ".to_string(),
            email: "a@x.com".to_string(),
            password: SecretString::from("pw"),
            phone: None,
        };

        let err = auth.register(&registration).await.unwrap_err();
        assert_eq!(err.reason, "Name is required");
    }

    #[tokio::test]
    async fn test_refresh_profile_without_session() {
        let auth = AuthManager::new(unreachable_api(), SessionStore::in_memory());
        assert!(auth.refresh_profile().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_profile_failure_keeps_session() {
        let (_backend, store) = seeded_store();
        let auth = AuthManager::new(unreachable_api(), store);

        assert!(auth.refresh_profile().await.is_none());
        assert_eq!(auth.context().user().unwrap(), profile());
    }
}
