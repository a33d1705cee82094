//! Per-endpoint check configuration.

use super::error::HealthError;
use std::time::Duration;

/// Scheduling and alerting settings for a single monitored endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckConfig {
    /// Desired re-check cadence
    pub interval: Duration,
    /// Max time a single probe execution may run
    pub timeout: Duration,
    /// Consecutive non-healthy results before an alert fires
    pub alert_threshold: u32,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            alert_threshold: 3,
        }
    }
}

impl CheckConfig {
    /// Overlay `patch` on top of this config, returning the merged result.
    pub fn merge(&self, patch: &CheckConfigPatch) -> Self {
        Self {
            interval: patch.interval.unwrap_or(self.interval),
            timeout: patch.timeout.unwrap_or(self.timeout),
            alert_threshold: patch.alert_threshold.unwrap_or(self.alert_threshold),
        }
    }

    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self) -> Result<(), HealthError> {
        if self.interval.is_zero() {
            return Err(HealthError::InvalidConfig {
                field: "interval",
                message: "interval must be greater than zero".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(HealthError::InvalidConfig {
                field: "timeout",
                message: "timeout must be greater than zero".to_string(),
            });
        }
        if self.alert_threshold < 1 {
            return Err(HealthError::InvalidConfig {
                field: "alert_threshold",
                message: format!(
                    "alert threshold must be at least 1, got {}",
                    self.alert_threshold
                ),
            });
        }
        Ok(())
    }
}

/// Partial [`CheckConfig`]; unset fields keep the base value on merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckConfigPatch {
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
    pub alert_threshold: Option<u32>,
}

impl CheckConfigPatch {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn alert_threshold(mut self, threshold: u32) -> Self {
        self.alert_threshold = Some(threshold);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.interval.is_none() && self.timeout.is_none() && self.alert_threshold.is_none()
    }
}
