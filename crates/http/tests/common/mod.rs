//! Shared helpers for the client integration tests

#![allow(dead_code)]

use club_core::{CoreResult, MemoryStorage, Navigator, SessionStore, TokenStorage};
use club_http::ApiClient;
use mockall::mock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

mock! {
    pub Nav {}

    impl Navigator for Nav {
        fn current_route(&self) -> String;
        fn redirect_to_login(&self);
    }
}

/// Navigator on `route` that must never redirect
pub fn staying_navigator(route: &str) -> MockNav {
    let mut navigator = MockNav::new();
    navigator
        .expect_current_route()
        .return_const(route.to_string());
    navigator.expect_redirect_to_login().never();
    navigator
}

/// Navigator on `route` that must redirect exactly once
pub fn redirecting_navigator(route: &str) -> MockNav {
    let mut navigator = MockNav::new();
    navigator
        .expect_current_route()
        .return_const(route.to_string());
    navigator.expect_redirect_to_login().times(1).return_const(());
    navigator
}

/// Token storage that counts removals per key
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    removals: Mutex<HashMap<String, usize>>,
}

impl CountingStorage {
    pub fn removals(&self, key: &str) -> usize {
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

/// Session holding the given tokens
pub fn session_with(access: Option<&str>, refresh: Option<&str>) -> Arc<SessionStore> {
    let session = SessionStore::in_memory();
    if let Some(access) = access {
        session.establish(access, refresh);
    }
    Arc::new(session)
}

pub fn client(
    server: &MockServer,
    session: Arc<SessionStore>,
    navigator: impl Navigator + 'static,
) -> ApiClient {
    ApiClient::builder()
        .base_url(server.uri())
        .session(session)
        .navigator(Arc::new(navigator))
        .build()
        .unwrap()
}
