//! Client error types

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request, usually a validation failure
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request could not be assembled
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status behind this error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            Self::Serialization(_) | Self::InvalidRequest(_) | Self::Configuration(_) => None,
        }
    }

    /// Whether the backend rejected the credentials (401)
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Whether the request never got an answer from the backend
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(err) if err.status().is_none())
    }

    /// Field-level messages from a 400 validation response
    ///
    /// Returns `None` for other errors or when the body is not a JSON object.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::BadRequest(body) => FieldErrors::from_body(body),
            _ => None,
        }
    }
}

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a validation body such as `{"email": ["Enter a valid email."]}`
    pub fn from_body(body: &str) -> Option<Self> {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
            return None;
        };

        let mut errors = Self::new();
        for (field, value) in map {
            match value {
                Value::String(message) => errors.add(field, message),
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(message) => errors.add(field.clone(), message),
                            other => errors.add(field.clone(), other.to_string()),
                        }
                    }
                }
                other => errors.add(field, other.to_string()),
            }
        }
        Some(errors)
    }

    /// Record a message for `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Messages for one field
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::AuthenticationFailed(_)
        ));
        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, "upstream".into());
        assert_eq!(err.status(), Some(502));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_field_errors_from_validation_body() {
        let err = ClientError::BadRequest(
            r#"{"email": ["Enter a valid email address."], "detail": "Invalid input", "amount": [1]}"#
                .into(),
        );
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("email"), ["Enter a valid email address."]);
        assert_eq!(errors.get("detail"), ["Invalid input"]);
        assert_eq!(errors.get("amount"), ["1"]);
        assert!(errors.get("password").is_empty());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_field_errors_absent_for_plain_bodies() {
        assert!(ClientError::BadRequest("nope".into()).field_errors().is_none());
        assert!(ClientError::NotFound("{}".into()).field_errors().is_none());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add("email", "required");
        errors.add("password", "too short");
        assert_eq!(errors.to_string(), "email: required; password: too short");
    }
}
