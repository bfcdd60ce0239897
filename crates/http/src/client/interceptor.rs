//! Outbound credential attachment

use super::request::ApiRequest;
use club_core::{PublicPaths, SessionStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides, per request, whether it leaves with a bearer token
#[derive(Clone)]
pub struct AuthInterceptor {
    session: Arc<SessionStore>,
    paths: Arc<PublicPaths>,
}

impl AuthInterceptor {
    pub const fn new(session: Arc<SessionStore>, paths: Arc<PublicPaths>) -> Self {
        Self { session, paths }
    }

    /// Attach or strip `Authorization` in place
    ///
    /// Public API paths never carry a token, even one the caller set by hand.
    /// Private paths get the stored token when there is one; otherwise the
    /// request is left as the caller built it.
    pub fn apply(&self, request: &mut ApiRequest) {
        if self.paths.is_public_api(&request.path) {
            if request.clear_authorization() {
                debug!(path = %request.path, "Stripped Authorization header from public request");
            }
            return;
        }

        if let Some(token) = self.session.access_token()
            && !request.set_bearer(&token)
        {
            warn!(path = %request.path, "Stored access token is not a valid header value");
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.paths.is_public_api(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, HeaderValue};

    fn interceptor(token: Option<&str>) -> AuthInterceptor {
        let session = SessionStore::in_memory();
        if let Some(token) = token {
            session.establish(token, None);
        }
        AuthInterceptor::new(Arc::new(session), Arc::new(PublicPaths::default()))
    }

    #[test]
    fn test_private_path_gets_token() {
        let mut request = ApiRequest::get("/admin/users/");
        interceptor(Some("abc")).apply(&mut request);
        assert_eq!(request.authorization().unwrap(), "Bearer abc");
    }

    #[test]
    fn test_public_paths_never_carry_token() {
        for path in [
            "/events/",
            "/achievements/",
            "/api/events/3/",
            "https://host/api/achievements/execom-members/",
        ] {
            let mut request = ApiRequest::get(path)
                .header(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));
            interceptor(Some("abc")).apply(&mut request);
            assert!(request.authorization().is_none(), "{path} leaked a token");
        }
    }

    #[test]
    fn test_private_path_without_token_is_untouched() {
        let mut request = ApiRequest::get("/payments/");
        interceptor(None).apply(&mut request);
        assert!(request.authorization().is_none());

        let mut request = ApiRequest::get("/payments/")
            .header(AUTHORIZATION, HeaderValue::from_static("Bearer manual"));
        interceptor(None).apply(&mut request);
        assert_eq!(request.authorization().unwrap(), "Bearer manual");
    }

    #[test]
    fn test_stored_token_replaces_manual_header() {
        let mut request = ApiRequest::get("/payments/")
            .header(AUTHORIZATION, HeaderValue::from_static("Bearer manual"));
        interceptor(Some("abc")).apply(&mut request);
        assert_eq!(request.authorization().unwrap(), "Bearer abc");
    }

    #[test]
    fn test_token_is_read_at_apply_time() {
        let session = Arc::new(SessionStore::in_memory());
        let interceptor =
            AuthInterceptor::new(session.clone(), Arc::new(PublicPaths::default()));

        session.establish("first", None);
        let mut request = ApiRequest::get("/auth/profile/");
        interceptor.apply(&mut request);
        assert_eq!(request.authorization().unwrap(), "Bearer first");

        session.replace_access("second", None);
        interceptor.apply(&mut request);
        assert_eq!(request.authorization().unwrap(), "Bearer second");
    }
}
