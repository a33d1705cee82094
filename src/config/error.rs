//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl From<crate::health::HealthError> for ConfigError {
    fn from(err: crate::health::HealthError) -> Self {
        match err {
            crate::health::HealthError::InvalidConfig { field, message } => {
                ConfigError::Validation {
                    field: field.to_string(),
                    message,
                }
            }
            crate::health::HealthError::InvalidName(name) => ConfigError::Validation {
                field: "endpoints.name".to_string(),
                message: format!("invalid endpoint name {name:?}"),
            },
        }
    }
}
