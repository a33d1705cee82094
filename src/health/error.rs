//! Error types for health monitoring.

use thiserror::Error;

/// Errors surfaced synchronously by the monitor's registration API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    /// A check configuration value is out of range
    #[error("invalid value for '{field}': {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    /// Endpoint name is empty or otherwise unusable as a key
    #[error("invalid endpoint name: {0:?}")]
    InvalidName(String),
}

/// Errors a probe can report instead of a verdict.
///
/// The evaluator converts every variant into an `unhealthy` result whose
/// `error` field is this error's `Display` output.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// The probe failed with a message
    #[error("{0}")]
    Failed(String),

    /// The probe task panicked
    #[error("probe panicked: {0}")]
    Panicked(String),
}

impl ProbeError {
    /// Build a [`ProbeError::Failed`] from anything printable.
    pub fn failed(message: impl std::fmt::Display) -> Self {
        ProbeError::Failed(message.to_string())
    }
}
