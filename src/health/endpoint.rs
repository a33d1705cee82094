//! Registered endpoints.

use super::config::{CheckConfig, CheckConfigPatch};
use super::state::{EndpointState, HealthCheckResult};
use crate::probe::Probe;
use std::sync::Arc;
use std::time::Duration;

/// Everything needed to register one monitored service.
///
/// # Example
///
/// ```
/// use healthwatch::health::EndpointRegistration;
/// use healthwatch::probe;
/// use std::time::Duration;
///
/// let registration = EndpointRegistration::new(
///     "api",
///     probe::http("api", "http://localhost:8080/health"),
/// )
/// .url("http://localhost:8080/health")
/// .interval(Duration::from_secs(10))
/// .alert_threshold(2);
/// assert_eq!(registration.name(), "api");
/// ```
#[derive(Clone)]
pub struct EndpointRegistration {
    pub(crate) name: String,
    pub(crate) url: Option<String>,
    pub(crate) probe: Arc<dyn Probe>,
    pub(crate) config: CheckConfigPatch,
}

impl EndpointRegistration {
    pub fn new(name: impl Into<String>, probe: impl Probe) -> Self {
        Self::with_shared_probe(name, Arc::new(probe))
    }

    pub fn with_shared_probe(name: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        Self {
            name: name.into(),
            url: None,
            probe,
            config: CheckConfigPatch::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display-only URL for the service.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Replace the whole config overlay.
    pub fn config(mut self, patch: CheckConfigPatch) -> Self {
        self.config = patch;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = Some(interval);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn alert_threshold(mut self, threshold: u32) -> Self {
        self.config.alert_threshold = Some(threshold);
        self
    }
}

/// Registry entry for one service.
pub(crate) struct Endpoint {
    pub url: Option<String>,
    pub probe: Arc<dyn Probe>,
    pub config: CheckConfig,
    pub state: EndpointState,
    /// Bumped on every (re-)registration; results for older generations are dropped
    pub generation: u64,
}

/// Read-only copy of an endpoint's configuration and running state.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSnapshot {
    pub name: String,
    pub url: Option<String>,
    pub config: CheckConfig,
    pub last_result: Option<HealthCheckResult>,
    pub consecutive_failures: u32,
    pub is_alerting: bool,
}

impl EndpointSnapshot {
    pub(crate) fn from_endpoint(name: &str, endpoint: &Endpoint) -> Self {
        Self {
            name: name.to_string(),
            url: endpoint.url.clone(),
            config: endpoint.config,
            last_result: endpoint.state.last_result.clone(),
            consecutive_failures: endpoint.state.consecutive_failures,
            is_alerting: endpoint.state.is_alerting,
        }
    }
}
