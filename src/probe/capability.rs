//! Generic boolean capability probe.

use super::Probe;
use crate::health::{HealthCheckResult, HealthStatus, ProbeError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

/// Maps a boolean check onto a verdict: `true` is healthy, `false` is
/// degraded, and an error is unhealthy.
pub struct CapabilityProbe<F> {
    name: String,
    check: F,
    metadata: HashMap<String, serde_json::Value>,
}

impl<F> CapabilityProbe<F> {
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
            metadata: HashMap::new(),
        }
    }

    /// Static metadata attached to every result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl<F, Fut, E> Probe for CapabilityProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async fn evaluate(&self) -> Result<HealthCheckResult, ProbeError> {
        let start = Instant::now();
        let outcome = (self.check)().await;
        let elapsed = start.elapsed();

        let mut result = match outcome {
            Ok(true) => HealthCheckResult::new(&self.name, HealthStatus::Healthy, elapsed),
            Ok(false) => HealthCheckResult::new(&self.name, HealthStatus::Degraded, elapsed),
            Err(e) => HealthCheckResult::unhealthy(&self.name, e.to_string(), elapsed),
        };
        result
            .metadata
            .extend(self.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(result)
    }
}
