//! Configuration for the club portal client
//!
//! Values are layered: built-in defaults, then an optional configuration
//! file, then `CLUB_*` environment variables (`CLUB_API__BASE_URL`,
//! `CLUB_PATHS__PUBLIC_ROUTES=/,/login,/events*`, ...).

use crate::error::{CoreError, CoreResult};
use crate::navigation::DEFAULT_LOGIN_ROUTE;
use crate::paths::{PathRule, PublicPaths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CLUB";

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend connection settings
    pub api: ApiConfig,

    /// Public path allow-lists
    pub paths: PathsConfig,

    /// Local state settings
    pub storage: StorageConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every relative request path is appended to
    pub base_url: String,

    /// Optional request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Public path allow-lists, one rule per entry (`/events*` for prefixes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Request paths that never carry credentials
    pub public_api: Vec<PathRule>,

    /// Routes on which an expired session does not force a login redirect
    pub public_routes: Vec<PathRule>,

    /// Route of the login view
    pub login_route: String,
}

/// Local state settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted session and logs
    pub data_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: None,
            user_agent: format!("club-portal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            public_api: PublicPaths::default_api_rules(),
            public_routes: PublicPaths::default_route_rules(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
        }
    }
}

impl PathsConfig {
    /// Build the classifier for these lists
    pub fn public_paths(&self) -> PublicPaths {
        PublicPaths::new(self.public_api.clone(), self.public_routes.clone())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = std::env::var("CLUB_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("club-portal")
            });

        Self { data_dir }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            paths: PathsConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed or the
    /// result fails validation
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Load configuration from file, layered over defaults and under the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();
        let rules = |rules: &[PathRule]| -> Vec<String> {
            rules.iter().map(ToString::to_string).collect()
        };

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.user_agent", defaults.api.user_agent)?
            .set_default("paths.public_api", rules(&defaults.paths.public_api))?
            .set_default("paths.public_routes", rules(&defaults.paths.public_routes))?
            .set_default("paths.login_route", defaults.paths.login_route)?
            .set_default(
                "storage.data_dir",
                defaults.storage.data_dir.to_string_lossy().to_string(),
            )?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("paths.public_api")
                    .with_list_parse_key("paths.public_routes"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field
    pub fn validate(&self) -> CoreResult<()> {
        let base = Url::parse(&self.api.base_url).map_err(|err| {
            CoreError::invalid_config(format!("api.base_url '{}': {err}", self.api.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(CoreError::invalid_config(format!(
                "api.base_url must use http or https, got '{}'",
                base.scheme()
            )));
        }

        if self.api.timeout_secs == Some(0) {
            return Err(CoreError::invalid_config(
                "api.timeout_secs must be greater than zero when set",
            ));
        }

        if !self.paths.login_route.starts_with('/') {
            return Err(CoreError::invalid_config(format!(
                "paths.login_route must start with '/', got '{}'",
                self.paths.login_route
            )));
        }

        Ok(())
    }
}
