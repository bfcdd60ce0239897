//! Authentication store
//!
//! Holds the signed-in user next to the token session. Tokens live in the
//! [`SessionStore`]; this store keeps the profile and derives the current
//! [`AuthStatus`] from both. Whenever the session loses its access token
//! (logout, or a failed refresh inside the client) the user is dropped too.

use club_core::SessionStore;
use club_http::types::{AuthResponse, ProfileUpdate, RegisterRequest, UserProfile};
use club_http::{ApiClient, ClientError, FilePart};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Whether someone is signed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticated(UserProfile),
}

impl AuthStatus {
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}

/// Authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Authentication state transitions
#[derive(Debug, Clone)]
pub enum AuthAction {
    SetLoading(bool),
    Login(UserProfile),
    UpdateUser(UserProfile),
    Failed(String),
    Logout,
}

impl AuthState {
    #[must_use]
    pub fn reduce(self, action: AuthAction) -> Self {
        match action {
            AuthAction::SetLoading(is_loading) => Self { is_loading, ..self },
            AuthAction::Login(user) | AuthAction::UpdateUser(user) => Self {
                user: Some(user),
                is_loading: false,
                error: None,
            },
            AuthAction::Failed(message) => Self {
                is_loading: false,
                error: Some(message),
                ..self
            },
            AuthAction::Logout => Self::default(),
        }
    }
}

/// Signed-in user plus the token session behind it
#[derive(Debug)]
pub struct AuthStore {
    client: ApiClient,
    session: Arc<SessionStore>,
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new(client: ApiClient, session: Arc<SessionStore>) -> Self {
        Self {
            client,
            session,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Restore the signed-in user from a stored token
    ///
    /// Any failure to fetch the profile clears the session.
    pub async fn initialize(&self) -> AuthStatus {
        if !self.session.is_authenticated() {
            debug!("No stored session, starting anonymous");
            self.dispatch(AuthAction::Logout);
            return AuthStatus::Anonymous;
        }

        self.dispatch(AuthAction::SetLoading(true));
        match self.client.profile().await {
            Ok(user) => {
                info!(user_id = user.id, "Restored session");
                self.dispatch(AuthAction::Login(user));
            }
            Err(e) => {
                warn!(error = %e, "Stored session rejected, signing out");
                // A failed refresh inside the client has already cleared it
                if self.session.is_authenticated() || self.session.refresh_token().is_some() {
                    self.session.clear();
                }
                self.dispatch(AuthAction::Logout);
            }
        }
        self.status()
    }

    /// Sign in and keep the returned tokens and user
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        self.dispatch(AuthAction::SetLoading(true));
        let result = self.client.login(email, password).await;
        self.complete(result)
    }

    /// Create an account and sign in with it
    pub async fn register(&self, data: &RegisterRequest) -> Result<UserProfile, ClientError> {
        self.dispatch(AuthAction::SetLoading(true));
        let result = self.client.register(data).await;
        self.complete(result)
    }

    pub fn logout(&self) {
        self.session.clear();
        self.dispatch(AuthAction::Logout);
        info!("Signed out");
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        let user = self.client.update_profile(update).await?;
        self.dispatch(AuthAction::UpdateUser(user.clone()));
        Ok(user)
    }

    pub async fn upload_profile_image(&self, image: FilePart) -> Result<UserProfile, ClientError> {
        let user = self.client.upload_profile_image(image).await?;
        self.dispatch(AuthAction::UpdateUser(user.clone()));
        Ok(user)
    }

    /// Signed-in user, `None` once the session has lost its access token
    pub fn current_user(&self) -> Option<UserProfile> {
        if !self.session.is_authenticated() {
            let stale = self.read_state().user.is_some();
            if stale {
                debug!("Session ended underneath the store, dropping user");
                self.dispatch(AuthAction::Logout);
            }
            return None;
        }
        self.read_state().user.clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.current_user()
            .map_or(AuthStatus::Anonymous, AuthStatus::Authenticated)
    }

    pub fn is_staff(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_staff)
    }

    /// Snapshot of the reducer state
    pub fn state(&self) -> AuthState {
        self.read_state().clone()
    }

    fn complete(
        &self,
        result: Result<AuthResponse, ClientError>,
    ) -> Result<UserProfile, ClientError> {
        match result {
            Ok(response) => {
                self.session
                    .establish(&response.access, response.refresh.as_deref());
                info!(user_id = response.user.id, "Signed in");
                self.dispatch(AuthAction::Login(response.user.clone()));
                Ok(response.user)
            }
            Err(e) => {
                self.dispatch(AuthAction::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn dispatch(&self, action: AuthAction) {
        let mut state = self.write_state();
        *state = std::mem::take(&mut *state).reduce(action);
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> UserProfile {
        UserProfile {
            id,
            email: "ada@example.org".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: None,
            department: None,
            profile_image: None,
            is_staff: false,
            is_member: true,
            is_active: true,
            membership_expires: None,
        }
    }

    #[test]
    fn test_reduce_login_clears_error() {
        let state = AuthState::default()
            .reduce(AuthAction::SetLoading(true))
            .reduce(AuthAction::Failed("bad".into()));
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("bad"));

        let state = state.reduce(AuthAction::Login(user(1)));
        assert_eq!(state.user.map(|u| u.id), Some(1));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_reduce_failure_keeps_user() {
        let state = AuthState::default()
            .reduce(AuthAction::Login(user(1)))
            .reduce(AuthAction::Failed("offline".into()));
        assert!(state.user.is_some());
    }

    #[test]
    fn test_reduce_logout_resets() {
        let state = AuthState::default()
            .reduce(AuthAction::Login(user(1)))
            .reduce(AuthAction::Logout);
        assert_eq!(state, AuthState::default());
    }

    #[test]
    fn test_current_user_follows_session() {
        let session = Arc::new(SessionStore::in_memory());
        let client = ApiClient::builder()
            .base_url("http://localhost:8000/api")
            .session(session.clone())
            .build()
            .unwrap();
        let store = AuthStore::new(client, session.clone());

        session.establish("abc", None);
        store.dispatch(AuthAction::Login(user(1)));
        assert_eq!(store.status(), AuthStatus::Authenticated(user(1)));

        session.clear_access();
        assert!(store.current_user().is_none());
        assert!(store.state().user.is_none());
    }
}
