//! The shared, read-only view of who is signed in.

use secrecy::SecretString;
use tokio::sync::watch;

use electromart_core::UserProfile;

/// A signed-in user: bearer token plus profile snapshot.
///
/// A token without a profile (or the reverse) cannot be represented.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    user: UserProfile,
}

impl Session {
    #[must_use]
    pub const fn new(token: SecretString, user: UserProfile) -> Self {
        Self { token, user }
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Same token, updated profile.
    #[must_use]
    pub fn with_user(&self, user: UserProfile) -> Self {
        Self {
            token: self.token.clone(),
            user,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user.id)
            .finish()
    }
}

/// Read handle on the current session.
///
/// Cheap to clone; every clone observes the same state. Only
/// [`AuthManager`](super::AuthManager) can change it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    rx: watch::Receiver<Option<Session>>,
}

impl SessionContext {
    pub(crate) const fn new(rx: watch::Receiver<Option<Session>>) -> Self {
        Self { rx }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.rx.borrow().clone()
    }

    /// Profile of the signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.rx.borrow().as_ref().map(|s| s.user().clone())
    }

    /// Bearer token of the signed-in user, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.rx.borrow().as_ref().map(|s| s.token().clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait until the session changes, then return the new value.
    ///
    /// Returns `None` from the outer option once the manager is gone.
    pub async fn changed(&mut self) -> Option<Option<Session>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use electromart_core::{LoyaltyTier, UserId};
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(points: u64) -> UserProfile {
        UserProfile {
            id: UserId::new("u1"),
            name: "Asha Rao".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            loyalty_points: points,
            loyalty_tier: LoyaltyTier::Bronze,
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(SecretString::from("jwt-abc"), profile(0));
        let debug = format!("{session:?}");
        assert!(!debug.contains("jwt-abc"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_with_user_keeps_token() {
        let session = Session::new(SecretString::from("t1"), profile(0));
        let updated = session.with_user(profile(500));
        assert_eq!(updated.token().expose_secret(), "t1");
        assert_eq!(updated.user().loyalty_points, 500);
    }

    #[tokio::test]
    async fn test_context_observes_changes() {
        let (tx, rx) = watch::channel(None);
        let mut context = SessionContext::new(rx);
        assert!(!context.is_authenticated());
        assert!(context.user().is_none());

        tx.send_replace(Some(Session::new(SecretString::from("t1"), profile(10))));
        let next = context.changed().await.unwrap();
        assert!(next.is_some());
        assert!(context.is_authenticated());
        assert_eq!(context.user().unwrap().loyalty_points, 10);
        assert_eq!(context.token().unwrap().expose_secret(), "t1");

        drop(tx);
        assert!(context.changed().await.is_none());
    }
}
