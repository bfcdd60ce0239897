//! Session token lifecycle
//!
//! The [`SessionStore`] is the only owner of the token pair. It is created
//! once per process, handed to the HTTP client and the auth store, and
//! mirrors every transition into durable [`TokenStorage`].

use crate::storage::{ACCESS_TOKEN_KEY, MemoryStorage, REFRESH_TOKEN_KEY, TokenStorage};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Snapshot of an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Shared owner of the access/refresh token pair
pub struct SessionStore {
    tokens: RwLock<Tokens>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    /// Load whatever tokens are already persisted in `storage`
    pub fn load(storage: Arc<dyn TokenStorage>) -> Self {
        let access = read_key(storage.as_ref(), ACCESS_TOKEN_KEY);
        let refresh = read_key(storage.as_ref(), REFRESH_TOKEN_KEY);
        debug!(
            has_access = access.is_some(),
            has_refresh = refresh.is_some(),
            "Loaded session from storage"
        );

        Self {
            tokens: RwLock::new(Tokens { access, refresh }),
            storage,
        }
    }

    /// Session kept only in memory
    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryStorage::new()))
    }

    /// Current access token, read fresh on every call
    pub fn access_token(&self) -> Option<String> {
        self.read().access.clone()
    }

    /// Current refresh token
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().access.is_some()
    }

    /// Snapshot of the session, if an access token is present
    pub fn snapshot(&self) -> Option<Session> {
        let tokens = self.read();
        tokens.access.as_ref().map(|access| Session {
            access_token: access.clone(),
            refresh_token: tokens.refresh.clone(),
        })
    }

    /// Start a session after login or registration
    pub fn establish(&self, access_token: &str, refresh_token: Option<&str>) {
        let mut tokens = self.write();
        tokens.access = Some(access_token.to_string());
        tokens.refresh = refresh_token.map(str::to_string);
        self.persist(ACCESS_TOKEN_KEY, Some(access_token));
        self.persist(REFRESH_TOKEN_KEY, refresh_token);
    }

    /// Install a refreshed access token, plus a rotated refresh token if one was issued
    pub fn replace_access(&self, access_token: &str, rotated_refresh: Option<&str>) {
        let mut tokens = self.write();
        tokens.access = Some(access_token.to_string());
        self.persist(ACCESS_TOKEN_KEY, Some(access_token));
        if let Some(refresh) = rotated_refresh {
            tokens.refresh = Some(refresh.to_string());
            self.persist(REFRESH_TOKEN_KEY, Some(refresh));
        }
    }

    /// Drop both tokens
    pub fn clear(&self) {
        let mut tokens = self.write();
        tokens.access = None;
        tokens.refresh = None;
        self.persist(ACCESS_TOKEN_KEY, None);
        self.persist(REFRESH_TOKEN_KEY, None);
    }

    /// Drop the access token only
    pub fn clear_access(&self) {
        self.write().access = None;
        self.persist(ACCESS_TOKEN_KEY, None);
    }

    fn persist(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.storage.set(key, value),
            None => self.storage.remove(key),
        };
        if let Err(err) = result {
            warn!(key, error = %err, "Failed to persist session token");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tokens> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tokens> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tokens = self.read();
        f.debug_struct("SessionStore")
            .field("has_access", &tokens.access.is_some())
            .field("has_refresh", &tokens.refresh.is_some())
            .finish_non_exhaustive()
    }
}

fn read_key(storage: &dyn TokenStorage, key: &str) -> Option<String> {
    storage.get(key).unwrap_or_else(|err| {
        warn!(key, error = %err, "Failed to read session token, treating as absent");
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, CoreResult};

    #[test]
    fn test_load_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        storage.set(REFRESH_TOKEN_KEY, "ref").unwrap();

        let session = SessionStore::load(storage);
        assert_eq!(
            session.snapshot(),
            Some(Session {
                access_token: "abc".into(),
                refresh_token: Some("ref".into()),
            })
        );
    }

    #[test]
    fn test_lifecycle_is_mirrored_to_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::load(storage.clone());
        assert!(!session.is_authenticated());

        session.establish("abc", Some("ref"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("ref"));

        session.replace_access("xyz", None);
        assert_eq!(session.access_token().as_deref(), Some("xyz"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("xyz"));

        session.replace_access("xyz2", Some("ref2"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("ref2"));

        session.clear();
        assert_eq!(session.snapshot(), None);
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_establish_without_refresh_drops_stale_refresh() {
        let session = SessionStore::in_memory();
        session.establish("old", Some("stale"));
        session.establish("new", None);
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn test_clear_access_keeps_refresh() {
        let session = SessionStore::in_memory();
        session.establish("abc", Some("ref"));
        session.clear_access();
        assert!(!session.is_authenticated());
        assert_eq!(session.refresh_token().as_deref(), Some("ref"));
    }

    struct BrokenStorage;

    impl TokenStorage for BrokenStorage {
        fn get(&self, _key: &str) -> CoreResult<Option<String>> {
            Err(CoreError::storage_error("disk on fire"))
        }

        fn set(&self, _key: &str, _value: &str) -> CoreResult<()> {
            Err(CoreError::storage_error("disk on fire"))
        }

        fn remove(&self, _key: &str) -> CoreResult<()> {
            Err(CoreError::storage_error("disk on fire"))
        }
    }

    #[test]
    fn test_storage_failures_do_not_block_transitions() {
        let session = SessionStore::load(Arc::new(BrokenStorage));
        assert!(!session.is_authenticated());

        session.establish("abc", None);
        assert_eq!(session.access_token().as_deref(), Some("abc"));

        session.clear();
        assert!(!session.is_authenticated());
    }
}
