//! Configuration errors.

use super::error_code::{self, HardgateErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

impl HardgateErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
