//! Terminal stand-in for browser navigation

use club_core::Navigator;
use std::sync::Mutex;
use tracing::warn;

/// Reports the command's route and prints a sign-in hint instead of redirecting
#[derive(Debug)]
pub struct TerminalNavigator {
    login_route: String,
    route: Mutex<String>,
}

impl TerminalNavigator {
    pub fn new(route: impl Into<String>, login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
            route: Mutex::new(route.into()),
        }
    }

    fn hint(&self) -> String {
        format!(
            "Your session has ended. Sign in again at {} (run `club login`).",
            self.login_route
        )
    }
}

impl Navigator for TerminalNavigator {
    fn current_route(&self) -> String {
        self.route
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn redirect_to_login(&self) {
        let mut route = self
            .route
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *route != self.login_route {
            warn!(from = %route, to = %self.login_route, "Session ended, sign-in required");
            eprintln!("{}", self.hint());
            route.clone_from(&self.login_route);
        }
    }
}
