//! Shared plumbing for JSON-loadable configuration structs.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to load or validate a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),

    #[error("malformed configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A configuration struct that can be validated and loaded from JSON.
///
/// Missing fields fall back to the struct's serde defaults; the loaded
/// value is validated before it is returned.
pub trait LoadConfig: DeserializeOwned {
    /// Check cross-field constraints.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Parse and validate a JSON document.
    fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
