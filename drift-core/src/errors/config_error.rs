//! Configuration validation errors.

use super::error_code::{self, DriftErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration value at {path}: {message}")]
    InvalidValue { path: String, message: String },

    #[error("failed to parse configuration: {message}")]
    ParseFailed { message: String },

    #[error("failed to read configuration file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DriftErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_INVALID
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed {
            message: err.to_string(),
        }
    }
}
