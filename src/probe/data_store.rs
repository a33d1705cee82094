//! Data-store probe.

use super::Probe;
use crate::health::{HealthCheckResult, HealthStatus, ProbeError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Instant;

/// Runs a no-argument async test operation (typically a trivial query).
///
/// Success is `healthy`; an error is `unhealthy` with the error message captured.
/// Every result carries `metadata.type = "database"`.
pub struct DataStoreProbe<F> {
    name: String,
    operation: F,
}

impl<F> DataStoreProbe<F> {
    pub fn new(name: impl Into<String>, operation: F) -> Self {
        Self {
            name: name.into(),
            operation,
        }
    }
}

#[async_trait]
impl<F, Fut, E> Probe for DataStoreProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async fn evaluate(&self) -> Result<HealthCheckResult, ProbeError> {
        let start = Instant::now();
        let outcome = (self.operation)().await;
        let elapsed = start.elapsed();

        let result = match outcome {
            Ok(()) => HealthCheckResult::new(&self.name, HealthStatus::Healthy, elapsed),
            Err(e) => HealthCheckResult::unhealthy(&self.name, e.to_string(), elapsed),
        };
        Ok(result.with_metadata("type", "database"))
    }
}
