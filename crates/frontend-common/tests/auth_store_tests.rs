//! Integration tests for the auth store

use club_core::{
    ACCESS_TOKEN_KEY, CoreResult, MemoryNavigator, MemoryStorage, Navigator, REFRESH_TOKEN_KEY,
    SessionStore, TokenStorage,
};
use club_frontend_common::{AuthStatus, AuthStore};
use club_http::types::{ProfileUpdate, RegisterRequest};
use club_http::{ApiClient, ClientError};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token storage that counts removals per key
#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    removals: Mutex<HashMap<String, usize>>,
}

impl CountingStorage {
    fn removals(&self, key: &str) -> usize {
        self.removals
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or_default()
    }
}

impl TokenStorage for CountingStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        *self
            .removals
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default() += 1;
        self.inner.remove(key)
    }
}

fn user_json() -> serde_json::Value {
    json!({
        "id": 7,
        "email": "ada@example.org",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "is_member": true
    })
}

fn store(server: &MockServer, session: Arc<SessionStore>) -> AuthStore {
    let client = ApiClient::builder()
        .base_url(server.uri())
        .session(session.clone())
        .navigator(Arc::new(MemoryNavigator::new("/dashboard")))
        .build()
        .unwrap();
    AuthStore::new(client, session)
}

#[tokio::test]
async fn test_initialize_without_token_is_anonymous() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = store(&mock_server, Arc::new(SessionStore::in_memory()));
    assert_eq!(store.initialize().await, AuthStatus::Anonymous);
}

#[tokio::test]
async fn test_initialize_restores_user() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    session.establish("abc", Some("ref"));
    let store = store(&mock_server, session);

    let status = store.initialize().await;
    assert_eq!(status.user().map(|user| user.id), Some(7));
}

#[tokio::test]
async fn test_initialize_clears_rejected_session() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    session.establish("abc", Some("ref"));
    let store = store(&mock_server, session.clone());

    assert_eq!(store.initialize().await, AuthStatus::Anonymous);
    assert!(session.snapshot().is_none());
    assert!(session.refresh_token().is_none());
}

#[tokio::test]
async fn test_login_stores_tokens_and_user() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .and(body_json(json!({"email": "ada@example.org", "password": "analytical"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "abc",
            "refresh": "ref",
            "user": user_json()
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    let store = store(&mock_server, session.clone());

    let user = store.login("ada@example.org", "analytical").await.unwrap();
    assert_eq!(user.full_name(), "Ada Lovelace");
    assert_eq!(session.access_token().as_deref(), Some("abc"));
    assert_eq!(session.refresh_token().as_deref(), Some("ref"));
    assert!(store.status().is_authenticated());
}

#[tokio::test]
async fn test_failed_login_propagates_and_keeps_session_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "No active account"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    let store = store(&mock_server, session.clone());

    let error = store.login("ada@example.org", "wrong").await.unwrap_err();
    assert!(matches!(error, ClientError::AuthenticationFailed(_)));
    assert!(!session.is_authenticated());
    assert!(store.current_user().is_none());
    assert!(store.state().error.is_some());
}

#[tokio::test]
async fn test_register_signs_in() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "fresh",
            "user": user_json()
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    let store = store(&mock_server, session.clone());

    let request = RegisterRequest {
        email: "ada@example.org".into(),
        password: "analytical".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        ..Default::default()
    };
    store.register(&request).await.unwrap();
    assert_eq!(session.access_token().as_deref(), Some("fresh"));
    assert!(session.refresh_token().is_none());
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "abc",
            "refresh": "ref",
            "user": user_json()
        })))
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    let store = store(&mock_server, session.clone());
    store.login("ada@example.org", "analytical").await.unwrap();

    store.logout();
    assert!(session.snapshot().is_none());
    assert_eq!(store.status(), AuthStatus::Anonymous);
}

#[tokio::test]
async fn test_update_profile_replaces_user() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile/"))
        .and(body_json(json!({"department": "ECE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "email": "ada@example.org",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "department": "ECE"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    session.establish("abc", None);
    let store = store(&mock_server, session);

    let update = ProfileUpdate {
        department: Some("ECE".into()),
        ..Default::default()
    };
    store.update_profile(&update).await.unwrap();
    assert_eq!(
        store.current_user().and_then(|user| user.department),
        Some("ECE".to_string())
    );
}

#[tokio::test]
async fn test_failed_refresh_signs_user_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payments/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    session.establish("abc", Some("ref"));
    let store = store(&mock_server, session.clone());
    assert!(store.initialize().await.is_authenticated());

    let error = store.client().list_payments().await.unwrap_err();
    assert!(error.is_unauthorized());
    assert!(store.current_user().is_none());
    assert!(session.refresh_token().is_none());
}

#[tokio::test]
async fn test_initialize_after_failed_refresh_clears_tokens_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let storage = Arc::new(CountingStorage::default());
    let session = Arc::new(SessionStore::load(storage.clone()));
    session.establish("abc", Some("ref"));
    let navigator = Arc::new(MemoryNavigator::new("/admin"));
    let client = ApiClient::builder()
        .base_url(mock_server.uri())
        .session(session.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();
    let store = AuthStore::new(client, session.clone());

    assert_eq!(store.initialize().await, AuthStatus::Anonymous);
    assert_eq!(storage.removals(ACCESS_TOKEN_KEY), 1);
    assert_eq!(storage.removals(REFRESH_TOKEN_KEY), 1);
    assert_eq!(navigator.redirect_count(), 1);
    assert_eq!(navigator.current_route(), "/login");
}

#[tokio::test]
async fn test_is_staff_follows_current_user() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "email": "admin@example.org",
            "is_staff": true
        })))
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    session.establish("abc", None);
    let store = store(&mock_server, session);
    assert!(!store.is_staff());

    store.initialize().await;
    assert!(store.is_staff());

    store.logout();
    assert!(!store.is_staff());
}
