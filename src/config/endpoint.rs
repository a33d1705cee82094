//! Check defaults and `[[endpoints]]` definitions

use crate::health::{CheckConfig, CheckConfigPatch, EndpointRegistration};
use crate::probe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process-wide check defaults (`[defaults]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
    pub alert_threshold: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let defaults = CheckConfig::default();
        Self {
            interval_seconds: defaults.interval.as_secs(),
            timeout_seconds: defaults.timeout.as_secs(),
            alert_threshold: defaults.alert_threshold,
        }
    }
}

impl DefaultsConfig {
    pub fn check_config(&self) -> CheckConfig {
        CheckConfig {
            interval: Duration::from_secs(self.interval_seconds),
            timeout: Duration::from_secs(self.timeout_seconds),
            alert_threshold: self.alert_threshold,
        }
    }
}

/// One HTTP endpoint to monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<u32>,
}

fn default_expected_status() -> u16 {
    200
}

impl EndpointConfig {
    /// Overrides set on this endpoint; unset fields fall back to `[defaults]`.
    pub fn patch(&self) -> CheckConfigPatch {
        CheckConfigPatch {
            interval: self.interval_seconds.map(Duration::from_secs),
            timeout: self.timeout_seconds.map(Duration::from_secs),
            alert_threshold: self.alert_threshold,
        }
    }

    /// Build an HTTP probe registration. The request timeout follows the
    /// endpoint's effective check timeout.
    pub fn registration(&self, defaults: &CheckConfig) -> EndpointRegistration {
        let patch = self.patch();
        let effective = defaults.merge(&patch);
        let probe = probe::http(&self.name, &self.url)
            .expected_status(self.expected_status)
            .timeout(effective.timeout);

        EndpointRegistration::new(&self.name, probe)
            .url(&self.url)
            .config(patch)
    }
}
