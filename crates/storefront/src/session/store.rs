//! Local key-value persistence for the session.
//!
//! The storefront's equivalent of browser local storage: a handful of string
//! values under fixed keys that survive restarts. Each key is read and
//! written atomically on its own; nothing spans keys.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::warn;

use electromart_core::UserProfile;

use super::context::Session;

/// Storage keys for the persisted session.
pub mod keys {
    /// Key for the bearer token.
    pub const TOKEN: &str = "token";

    /// Key for the JSON-serialized user profile.
    pub const USER: &str = "user";
}

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a key failed.
    #[error("session store I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The profile could not be serialized.
    #[error("session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Keys are limited to ASCII letters, digits, `-` and `_`.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
}

/// A string key-value store with per-key atomic writes.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. A missing key is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the key exists but cannot be removed.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// One file per key under a directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// sees either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The directory holding the keys.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        let tmp = self.dir.join(format!(".{key}.tmp"));
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store. Nothing survives the process; used by tests and
/// one-shot tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// The persisted session: token and profile under [`keys`].
///
/// Only the auth manager holds one of these.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wrap any key-value backend.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// A file-backed store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(FileStore::open(dir)?)))
    }

    /// A store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load the persisted session.
    ///
    /// Returns `None` unless both keys are present and the profile parses.
    /// A half-written or corrupt session is cleared so the store never holds
    /// one key without the other for longer than a failed write. A read
    /// error leaves the store as it is.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let (token, user) = match (self.read(keys::TOKEN), self.read(keys::USER)) {
            (Ok(token), Ok(user)) => (token, user),
            (token, user) => {
                for e in [token.err(), user.err()].into_iter().flatten() {
                    warn!(error = %e, "Failed to read session store");
                }
                return None;
            }
        };

        match (token, user) {
            (None, None) => None,
            (Some(token), Some(user)) => match serde_json::from_str::<UserProfile>(&user) {
                Ok(user) => Some(Session::new(SecretString::from(token), user)),
                Err(e) => {
                    warn!(error = %e, "Discarding persisted session with unreadable profile");
                    self.discard();
                    None
                }
            },
            (token, _) => {
                warn!(
                    has_token = token.is_some(),
                    "Discarding partial persisted session"
                );
                self.discard();
                None
            }
        }
    }

    /// Persist a session.
    ///
    /// The profile is written before the token. If either write fails, both
    /// keys are put back to what they held before, so a failed save leaves
    /// any earlier session in place.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the earlier values cannot be read or either
    /// key cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let user = serde_json::to_string(session.user())?;
        let prior_token = self.backend.get(keys::TOKEN)?;
        let prior_user = self.backend.get(keys::USER)?;

        let written = self
            .backend
            .set(keys::USER, &user)
            .and_then(|()| self.backend.set(keys::TOKEN, session.token().expose_secret()));

        if let Err(e) = written {
            self.restore(keys::USER, prior_user.as_deref());
            self.restore(keys::TOKEN, prior_token.as_deref());
            return Err(e);
        }
        Ok(())
    }

    /// Remove both keys. Both removals are attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first `StoreError` encountered.
    pub fn clear(&self) -> Result<(), StoreError> {
        let token = self.backend.remove(keys::TOKEN);
        let user = self.backend.remove(keys::USER);
        token.and(user)
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.backend.get(key)?.filter(|v| !v.is_empty()))
    }

    /// Put a key back to an earlier value, logging any failure.
    fn restore(&self, key: &str, prior: Option<&str>) {
        let restored = match prior {
            Some(value) => self.backend.set(key, value),
            None => self.backend.remove(key),
        };
        if let Err(e) = restored {
            warn!(error = %e, key, "Failed to roll back session store");
        }
    }

    fn discard(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to clear partial session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use electromart_core::{LoyaltyTier, UserId};

    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("u1"),
            name: "Asha".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            loyalty_points: 0,
            loyalty_tier: LoyaltyTier::Bronze,
        }
    }

    fn session() -> Session {
        Session::new(SecretString::from("t1"), profile())
    }

    #[test]
    fn test_file_store_roundtrip_and_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        assert_eq!(store.get("token").unwrap(), None);
        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));

        store.set("token", "def").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("def"));

        store.remove("token").unwrap();
        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        SessionStore::open(dir.path()).unwrap().save(&session()).unwrap();

        let reopened = SessionStore::open(dir.path()).unwrap();
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.token().expose_secret(), "t1");
        assert_eq!(loaded.user(), &profile());
    }

    #[test]
    fn test_save_then_clear() {
        let backend = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backend.clone());

        store.save(&session()).unwrap();
        assert_eq!(backend.get(keys::TOKEN).unwrap().as_deref(), Some("t1"));
        assert!(backend.get(keys::USER).unwrap().unwrap().contains("\"u1\""));

        store.clear().unwrap();
        assert!(backend.is_empty());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_discards_token_without_user() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::TOKEN, "orphan").unwrap();

        let store = SessionStore::new(backend.clone());
        assert!(store.load().is_none());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_load_discards_user_without_token() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(keys::USER, &serde_json::to_string(&profile()).unwrap())
            .unwrap();

        let store = SessionStore::new(backend.clone());
        assert!(store.load().is_none());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_load_discards_corrupt_profile() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::TOKEN, "t1").unwrap();
        backend.set(keys::USER, "{not json").unwrap();

        let store = SessionStore::new(backend.clone());
        assert!(store.load().is_none());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_clear_on_empty_store_succeeds() {
        assert!(SessionStore::in_memory().clear().is_ok());
    }

    /// Memory store that fails reads or writes of one key.
    struct FlakyStore {
        inner: MemoryStore,
        fail_get: Option<&'static str>,
        fail_set: Option<&'static str>,
    }

    impl FlakyStore {
        fn fault(key: &str) -> StoreError {
            StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            }
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_get == Some(key) {
                return Err(Self::fault(key));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_set == Some(key) {
                return Err(Self::fault(key));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn prior_session() -> Session {
        let mut user = profile();
        user.id = UserId::new("u-old");
        Session::new(SecretString::from("old"), user)
    }

    fn flaky_with_prior(
        fail_get: Option<&'static str>,
        fail_set: Option<&'static str>,
    ) -> Arc<FlakyStore> {
        let prior = prior_session();
        let inner = MemoryStore::new();
        inner.set(keys::TOKEN, prior.token().expose_secret()).unwrap();
        inner
            .set(keys::USER, &serde_json::to_string(prior.user()).unwrap())
            .unwrap();
        Arc::new(FlakyStore {
            inner,
            fail_get,
            fail_set,
        })
    }

    #[test]
    fn test_failed_user_write_keeps_prior_session() {
        let store = SessionStore::new(flaky_with_prior(None, Some(keys::USER)));

        assert!(store.save(&session()).is_err());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.token().expose_secret(), "old");
        assert_eq!(loaded.user().id.as_str(), "u-old");
    }

    #[test]
    fn test_failed_token_write_restores_prior_user() {
        let store = SessionStore::new(flaky_with_prior(None, Some(keys::TOKEN)));

        assert!(store.save(&session()).is_err());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.token().expose_secret(), "old");
        assert_eq!(loaded.user().id.as_str(), "u-old");
    }

    #[test]
    fn test_failed_write_on_empty_store_leaves_it_empty() {
        let backend = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            fail_get: None,
            fail_set: Some(keys::TOKEN),
        });
        let store = SessionStore::new(backend.clone());

        assert!(store.save(&session()).is_err());
        assert!(backend.inner.is_empty());
    }

    #[test]
    fn test_read_error_does_not_discard_session() {
        let backend = flaky_with_prior(Some(keys::USER), None);
        let store = SessionStore::new(backend.clone());

        assert!(store.load().is_none());
        assert_eq!(
            backend.inner.get(keys::TOKEN).unwrap().as_deref(),
            Some("old")
        );
        assert!(backend.inner.get(keys::USER).unwrap().is_some());
    }
}
