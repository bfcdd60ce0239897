//! Club portal HTTP client
//!
//! Every call goes through one [`ApiClient`]: the [`AuthInterceptor`] decides
//! whether the request carries the stored bearer token, and a 401 on a
//! private path gets one refresh-and-resend before the session is dropped.

pub mod admin;
pub mod auth;
pub mod error;
pub mod events;
pub mod forms;
pub mod interceptor;
pub mod payments;
pub mod phase;
pub mod request;

use club_core::{ClientConfig, MemoryNavigator, Navigator, PublicPaths, SessionStore};
use error::ClientError;
use interceptor::AuthInterceptor;
use phase::{RequestPhase, UnauthorizedAction};
use request::{ApiRequest, RequestBody};
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared client for the club portal backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    paths: Arc<PublicPaths>,
    navigator: Arc<dyn Navigator>,
    interceptor: AuthInterceptor,
}

impl ApiClient {
    /// Create a new client with an in-memory session
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session shared with this client
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn public_paths(&self) -> &PublicPaths {
        &self.paths
    }

    /// Send a request through the interceptors
    ///
    /// Returns the successful response; error statuses become [`ClientError`]s.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ClientError> {
        let mut request = request;
        let public = self.interceptor.is_public(&request.path);
        let mut phase = RequestPhase::Sent;

        loop {
            self.interceptor.apply(&mut request);

            let error = match self.dispatch(&request).await {
                Ok(response) => {
                    debug!(path = %request.path, phase = ?phase.finish(), "Request completed");
                    return Ok(response);
                }
                Err(error) => error,
            };

            if !error.is_unauthorized() {
                return Err(error);
            }

            match phase.on_unauthorized(public) {
                UnauthorizedAction::Propagate => {
                    debug!(path = %request.path, ?phase, "Propagating 401");
                    return Err(error);
                }
                UnauthorizedAction::Refresh => {
                    phase = phase.begin_refresh();
                    debug!(path = %request.path, ?phase, "Access token rejected");
                    let token = self.recover_session(error).await?;
                    request.set_bearer(&token);
                    phase = phase.retry();
                }
            }
        }
    }

    /// Send a request and decode the JSON response
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request whose response body is irrelevant
    pub async fn execute_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.send(request).await.map(drop)
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// The session is cleared when recovery is impossible, and the user is
    /// sent to the login view unless they are on a public route.
    async fn recover_session(&self, original: ClientError) -> Result<String, ClientError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("Access token rejected and no refresh token stored, dropping access token");
            self.session.clear_access();
            self.redirect_to_login_if_private();
            return Err(original);
        };

        match self.refresh_access_token(&refresh_token).await {
            Ok(tokens) => {
                self.session
                    .replace_access(&tokens.access, tokens.refresh.as_deref());
                info!(rotated = tokens.refresh.is_some(), "Access token refreshed");
                Ok(tokens.access)
            }
            Err(error) => {
                warn!(%error, "Token refresh failed, clearing session");
                self.session.clear();
                self.redirect_to_login_if_private();
                Err(error)
            }
        }
    }

    fn redirect_to_login_if_private(&self) {
        let route = self.navigator.current_route();
        if self.paths.is_public_route(&route) {
            debug!(%route, "Staying on public route after losing the session");
        } else {
            info!(%route, "Redirecting to login");
            self.navigator.redirect_to_login();
        }
    }

    /// Put a request on the wire as-is, bypassing the interceptors
    async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url_for(&request.path))
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(body) => builder.multipart(body.to_form()?),
        };

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    paths: Option<PublicPaths>,
    session: Option<Arc<SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Take base URL, timeout, user agent and public paths from configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default()
            .base_url(config.api.base_url.clone())
            .user_agent(config.api.user_agent.clone())
            .public_paths(config.paths.public_paths())
            .navigator(Arc::new(MemoryNavigator::with_login_route(
                "/",
                config.paths.login_route.clone(),
            )));
        if let Some(timeout) = config.api.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Replace the public path allow-lists
    pub fn public_paths(mut self, paths: PublicPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Share an existing session
    pub fn session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the navigator used for forced login redirects
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent(concat!(
                "club-portal/",
                env!("CARGO_PKG_VERSION")
            ));
        }

        let client = client_builder.build()?;
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(SessionStore::in_memory()));
        let paths = Arc::new(self.paths.unwrap_or_default());
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(MemoryNavigator::default()));

        Ok(ApiClient {
            client,
            base_url,
            interceptor: AuthInterceptor::new(session.clone(), paths.clone()),
            session,
            paths,
            navigator,
        })
    }
}
