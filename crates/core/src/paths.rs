//! Public path classification
//!
//! Two allow-lists are kept apart on purpose: one for outbound API requests
//! (which never carry credentials when public) and one for application routes
//! (which suppress the forced login redirect). A path may be on either list
//! without being on the other.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Base used to resolve relative references into a pathname
const RELATIVE_BASE: &str = "http://localhost/";

/// Reduce an absolute URL, relative reference or browser pathname to its pathname.
///
/// Malformed input yields `/` instead of an error.
pub fn normalize_path(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return "/".to_string();
    }

    match Url::parse(input) {
        Ok(url) if url.cannot_be_a_base() => "/".to_string(),
        Ok(url) => url.path().to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => normalize_relative(input),
        Err(_) => "/".to_string(),
    }
}

fn normalize_relative(input: &str) -> String {
    // A relative reference may not carry a colon in its first segment
    let first_segment = input.split(['/', '?', '#']).next().unwrap_or_default();
    if first_segment.contains(':') {
        return "/".to_string();
    }

    let Ok(base) = Url::parse(RELATIVE_BASE) else {
        return "/".to_string();
    };

    base.join(input)
        .map_or_else(|_| "/".to_string(), |url| url.path().to_string())
}

/// A single allow-list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PathRule {
    /// Matches the path itself, with or without one trailing slash
    Exact(String),
    /// Matches the path and anything below it on a segment boundary
    Prefix(String),
}

impl PathRule {
    /// Exact rule for `path`
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    /// Prefix rule for `path`
    pub fn prefix(path: impl Into<String>) -> Self {
        Self::Prefix(path.into())
    }

    /// Whether an already normalized pathname matches this rule
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(rule) => {
                path == rule || (rule != "/" && path.strip_suffix('/') == Some(rule.as_str()))
            }
            Self::Prefix(rule) => {
                let rule = rule.trim_end_matches('/');
                path.strip_prefix(rule)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            }
        }
    }
}

impl FromStr for PathRule {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        if !trimmed.starts_with('/') {
            return Err(CoreError::invalid_path_rule(s, "rules must start with '/'"));
        }

        match trimmed.strip_suffix('*') {
            Some(prefix) if prefix.contains('*') => Err(CoreError::invalid_path_rule(
                s,
                "only a single trailing '*' is allowed",
            )),
            Some(prefix) => Ok(Self::Prefix(prefix.to_string())),
            None if trimmed.contains('*') => Err(CoreError::invalid_path_rule(
                s,
                "'*' is only allowed at the end of a rule",
            )),
            None => Ok(Self::Exact(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for PathRule {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl From<PathRule> for String {
    fn from(rule: PathRule) -> Self {
        rule.to_string()
    }
}

impl fmt::Display for PathRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(path) => write!(f, "{path}"),
            Self::Prefix(path) => write!(f, "{path}*"),
        }
    }
}

/// The API and route allow-lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPaths {
    api: Vec<PathRule>,
    routes: Vec<PathRule>,
}

impl PublicPaths {
    /// Create a classifier from explicit rule lists
    pub const fn new(api: Vec<PathRule>, routes: Vec<PathRule>) -> Self {
        Self { api, routes }
    }

    /// Default public API paths
    pub fn default_api_rules() -> Vec<PathRule> {
        vec![
            PathRule::prefix("/events"),
            PathRule::prefix("/achievements"),
            PathRule::prefix("/api/events"),
            PathRule::prefix("/api/achievements"),
        ]
    }

    /// Default public application routes
    pub fn default_route_rules() -> Vec<PathRule> {
        vec![
            PathRule::exact("/"),
            PathRule::exact("/login"),
            PathRule::exact("/register"),
            PathRule::prefix("/events"),
        ]
    }

    /// Whether a request URL or path is exempt from authentication
    pub fn is_public_api(&self, url: &str) -> bool {
        let path = normalize_path(url);
        self.api.iter().any(|rule| rule.matches(&path))
    }

    /// Whether an application route is reachable without a session
    pub fn is_public_route(&self, pathname: &str) -> bool {
        let path = normalize_path(pathname);
        self.routes.iter().any(|rule| rule.matches(&path))
    }
}

impl Default for PublicPaths {
    fn default() -> Self {
        Self::new(Self::default_api_rules(), Self::default_route_rules())
    }
}
