//! Navigation seam between the HTTP layer and whatever presents routes

use std::sync::{Mutex, PoisonError};

/// Default login route
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Access to the current application route and the forced login redirect
pub trait Navigator: Send + Sync {
    /// Pathname of the route currently shown to the user
    fn current_route(&self) -> String;

    /// Leave the current route for the login view
    fn redirect_to_login(&self);
}

#[derive(Debug)]
struct NavigatorState {
    route: String,
    redirects: usize,
}

/// Navigator that only tracks state in memory
///
/// Used by headless front ends and tests: a redirect moves the current
/// route to the login route and bumps a counter.
#[derive(Debug)]
pub struct MemoryNavigator {
    login_route: String,
    state: Mutex<NavigatorState>,
}

impl MemoryNavigator {
    pub fn new(route: impl Into<String>) -> Self {
        Self::with_login_route(route, DEFAULT_LOGIN_ROUTE)
    }

    pub fn with_login_route(route: impl Into<String>, login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
            state: Mutex::new(NavigatorState {
                route: route.into(),
                redirects: 0,
            }),
        }
    }

    /// Move to another route
    pub fn navigate(&self, route: impl Into<String>) {
        self.lock().route = route.into();
    }

    /// Number of forced login redirects so far
    pub fn redirect_count(&self) -> usize {
        self.lock().redirects
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavigatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> String {
        self.lock().route.clone()
    }

    fn redirect_to_login(&self) {
        let mut state = self.lock();
        state.route.clone_from(&self.login_route);
        state.redirects += 1;
    }
}
