//! Error types shared across the club portal crates

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Core error types that can be shared across crates
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid path rule '{rule}': {message}")]
    InvalidPathRule { rule: String, message: String },

    #[error("Storage operation failed: {message}")]
    Storage { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl CoreError {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid path rule error
    pub fn invalid_path_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPathRule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::storage_error(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::invalid_config(err.to_string())
    }
}
