//! Health verdicts and per-endpoint running state.

use super::config::CheckConfig;
use crate::alert::HealthAlert;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Health verdict for a service or for the whole system.
///
/// Variant order is the aggregation order: `Unhealthy > Degraded > Healthy > Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Unknown,
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        self == HealthStatus::Healthy
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Unknown => "unknown",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one probe evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub service_name: String,
    pub status: HealthStatus,
    /// Elapsed wall-clock time of the evaluation
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Probe-specific context (status codes, probe type, ...)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl HealthCheckResult {
    pub fn new(service_name: impl Into<String>, status: HealthStatus, response_time: Duration) -> Self {
        Self {
            service_name: service_name.into(),
            status,
            response_time_ms: response_time.as_millis() as u64,
            timestamp: Utc::now(),
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// An `unhealthy` result carrying `error`.
    pub fn unhealthy(
        service_name: impl Into<String>,
        error: impl Into<String>,
        response_time: Duration,
    ) -> Self {
        Self::new(service_name, HealthStatus::Unhealthy, response_time).with_error(error)
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn response_time(&self) -> Duration {
        Duration::from_millis(self.response_time_ms)
    }
}

/// Running state tracked for one endpoint across evaluations.
#[derive(Debug, Clone, Default)]
pub struct EndpointState {
    /// Most recent result, `None` until the first evaluation
    pub last_result: Option<HealthCheckResult>,
    /// Consecutive non-healthy results; reset on a healthy one
    pub consecutive_failures: u32,
    /// Latched once a failure alert fires, cleared on recovery
    pub is_alerting: bool,
}

impl EndpointState {
    /// Fold `result` into the state and return the alert this evaluation
    /// triggers, if any.
    ///
    /// A failure alert fires on the first evaluation where the failure count
    /// is at or above `alert_threshold` and the latch is not set. A recovery
    /// alert fires on the first healthy result after a failure alert.
    pub fn apply_result(
        &mut self,
        result: HealthCheckResult,
        config: &CheckConfig,
    ) -> Option<HealthAlert> {
        let alert = if result.status.is_healthy() {
            self.consecutive_failures = 0;
            if self.is_alerting {
                self.is_alerting = false;
                Some(HealthAlert::recovery(&result))
            } else {
                None
            }
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.consecutive_failures >= config.alert_threshold && !self.is_alerting {
                self.is_alerting = true;
                Some(HealthAlert::failure(&result, self.consecutive_failures))
            } else {
                None
            }
        };

        self.last_result = Some(result);
        alert
    }

    /// Bring the latch in line with a changed threshold.
    ///
    /// A latch whose failure count no longer reaches the threshold is cleared
    /// without a recovery alert, so the next failure that reaches the new
    /// threshold alerts again. A lowered threshold needs no adjustment here:
    /// the next failing evaluation alerts if the count already meets it.
    pub fn reconcile(&mut self, config: &CheckConfig) {
        if self.is_alerting && self.consecutive_failures < config.alert_threshold {
            self.is_alerting = false;
        }
    }
}
