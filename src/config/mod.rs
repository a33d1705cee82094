//! Configuration module for healthwatch
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. Environment variables (`HEALTHWATCH_*`)
//! 2. Configuration file (TOML)
//! 3. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use healthwatch::config::MonitorConfig;
//!
//! let toml = r#"
//! [defaults]
//! alert_threshold = 2
//!
//! [[endpoints]]
//! name = "api"
//! url = "http://localhost:8080/health"
//! "#;
//! let config: MonitorConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.defaults.alert_threshold, 2);
//! assert_eq!(config.endpoints.len(), 1);
//! assert!(config.validate().is_ok());
//! ```

pub mod alerts;
pub mod endpoint;
pub mod error;
pub mod logging;

pub use alerts::AlertsConfig;
pub use endpoint::{DefaultsConfig, EndpointConfig};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

use crate::health::{CheckConfig, HealthMonitor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the monitor and the CLI around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Check defaults every endpoint is merged over
    pub defaults: DefaultsConfig,
    pub logging: LoggingConfig,
    pub alerts: AlertsConfig,
    /// HTTP endpoints to monitor
    pub endpoints: Vec<EndpointConfig>,
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored and the current value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("HEALTHWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HEALTHWATCH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(interval) = std::env::var("HEALTHWATCH_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.defaults.interval_seconds = secs;
            }
        }
        if let Ok(timeout) = std::env::var("HEALTHWATCH_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.defaults.timeout_seconds = secs;
            }
        }
        if let Ok(threshold) = std::env::var("HEALTHWATCH_ALERT_THRESHOLD") {
            if let Ok(n) = threshold.parse() {
                self.defaults.alert_threshold = n;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let defaults = self.defaults.check_config();
        defaults.validate().map_err(|e| prefixed("defaults", e))?;

        if self.alerts.history_limit == 0 {
            return Err(ConfigError::Validation {
                field: "alerts.history_limit".to_string(),
                message: "history limit must be at least 1".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            if endpoint.name.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("endpoints[{}].name", i),
                    message: "name cannot be empty".to_string(),
                });
            }
            if endpoint.url.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("endpoints[{}].url", i),
                    message: "URL cannot be empty".to_string(),
                });
            }
            if !seen.insert(endpoint.name.as_str()) {
                return Err(ConfigError::Validation {
                    field: format!("endpoints[{}].name", i),
                    message: format!("duplicate endpoint name '{}'", endpoint.name),
                });
            }
            defaults
                .merge(&endpoint.patch())
                .validate()
                .map_err(|e| prefixed(&format!("endpoints[{}]", i), e))?;
        }

        Ok(())
    }

    /// Check defaults as a [`CheckConfig`].
    pub fn check_defaults(&self) -> CheckConfig {
        self.defaults.check_config()
    }

    /// Register every configured endpoint with `monitor`.
    pub fn register_endpoints(&self, monitor: &HealthMonitor) -> Result<(), ConfigError> {
        let defaults = monitor.defaults();
        for endpoint in &self.endpoints {
            monitor.register_endpoint(endpoint.registration(&defaults))?;
        }
        Ok(())
    }
}

fn prefixed(section: &str, err: crate::health::HealthError) -> ConfigError {
    match ConfigError::from(err) {
        ConfigError::Validation { field, message } => ConfigError::Validation {
            field: format!("{}.{}", section, field),
            message,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    fn endpoint(name: &str, url: &str) -> EndpointConfig {
        EndpointConfig {
            name: name.to_string(),
            url: url.to_string(),
            expected_status: 200,
            interval_seconds: None,
            timeout_seconds: None,
            alert_threshold: None,
        }
    }

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.defaults.interval_seconds, 30);
        assert_eq!(config.defaults.timeout_seconds, 5);
        assert_eq!(config.defaults.alert_threshold, 3);
        assert!(config.alerts.log);
        assert!(config.alerts.history_dir.is_none());
        assert!(config.endpoints.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_partial_section() {
        let toml = r#"
        [defaults]
        timeout_seconds = 2
        "#;

        let config: MonitorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.defaults.timeout_seconds, 2);
        assert_eq!(config.defaults.interval_seconds, 30); // Default
    }

    #[test]
    fn test_config_parse_example_file() {
        let toml = include_str!("../../healthwatch.example.toml");
        let config: MonitorConfig = toml::from_str(toml).unwrap();
        assert!(!config.endpoints.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[defaults]\nalert_threshold = 1").unwrap();

        let config = MonitorConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.defaults.alert_threshold, 1);
    }

    #[test]
    fn test_config_load_none_is_default() {
        let config = MonitorConfig::load(None).unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = MonitorConfig::load(Some(Path::new("/nonexistent/healthwatch.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_invalid_toml_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[defaults\nalert_threshold = ").unwrap();

        let result = MonitorConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_env_override_threshold() {
        std::env::set_var("HEALTHWATCH_ALERT_THRESHOLD", "7");
        let config = MonitorConfig::default().with_env_overrides();
        std::env::remove_var("HEALTHWATCH_ALERT_THRESHOLD");

        assert_eq!(config.defaults.alert_threshold, 7);
    }

    #[test]
    fn test_config_env_override_invalid_ignored() {
        std::env::set_var("HEALTHWATCH_INTERVAL", "soon");
        let config = MonitorConfig::default().with_env_overrides();
        std::env::remove_var("HEALTHWATCH_INTERVAL");

        assert_eq!(config.defaults.interval_seconds, 30);
    }

    #[test]
    fn test_validate_rejects_zero_default_timeout() {
        let mut config = MonitorConfig::default();
        config.defaults.timeout_seconds = 0;

        match config.validate() {
            Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "defaults.timeout"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = MonitorConfig::default();
        config.endpoints.push(endpoint("api", ""));

        match config.validate() {
            Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "endpoints[0].url"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut config = MonitorConfig::default();
        config.endpoints.push(endpoint("api", "http://a/health"));
        config.endpoints.push(endpoint("api", "http://b/health"));

        match config.validate() {
            Err(ConfigError::Validation { field, message }) => {
                assert_eq!(field, "endpoints[1].name");
                assert!(message.contains("duplicate"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_endpoint_zero_threshold() {
        let mut config = MonitorConfig::default();
        let mut api = endpoint("api", "http://a/health");
        api.alert_threshold = Some(0);
        config.endpoints.push(api);

        match config.validate() {
            Err(ConfigError::Validation { field, .. }) => {
                assert_eq!(field, "endpoints[0].alert_threshold")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_register_endpoints_merges_defaults() {
        let mut config = MonitorConfig::default();
        config.defaults.interval_seconds = 60;
        let mut api = endpoint("api", "http://localhost:1/health");
        api.alert_threshold = Some(1);
        config.endpoints.push(api);

        let monitor = HealthMonitor::with_defaults(config.check_defaults()).unwrap();
        config.register_endpoints(&monitor).unwrap();

        let snapshot = monitor.endpoint("api").unwrap();
        assert_eq!(snapshot.config.interval, Duration::from_secs(60));
        assert_eq!(snapshot.config.alert_threshold, 1);
        assert_eq!(snapshot.url.as_deref(), Some("http://localhost:1/health"));
    }
}
