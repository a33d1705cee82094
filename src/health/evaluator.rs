//! Single-probe execution with a timeout race.

use super::error::ProbeError;
use super::state::HealthCheckResult;
use crate::probe::Probe;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error recorded when the probe does not settle within its timeout.
pub const TIMEOUT_ERROR: &str = "Health check timeout";

/// Run `probe` once, bounded by `timeout`, and normalize the outcome.
///
/// - `Ok(result)` from the probe is returned as-is, except that its
///   `service_name` is set to `service_name`; the registered name always wins.
/// - A probe error or panic becomes `unhealthy` with the error message and
///   the elapsed time.
/// - If the timer wins, the probe task is aborted and the result is
///   `unhealthy` with [`TIMEOUT_ERROR`] and a response time equal to `timeout`.
///
/// Never fails; every outcome is a [`HealthCheckResult`].
pub async fn evaluate_probe(
    service_name: &str,
    probe: Arc<dyn Probe>,
    timeout: Duration,
) -> HealthCheckResult {
    let start = Instant::now();
    let mut task = tokio::spawn(async move { probe.evaluate().await });

    let result = match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(Ok(mut result))) => {
            result.service_name = service_name.to_string();
            result
        }
        Ok(Ok(Err(e))) => HealthCheckResult::unhealthy(service_name, e.to_string(), start.elapsed()),
        Ok(Err(join_error)) => {
            let error = if join_error.is_panic() {
                ProbeError::Panicked(panic_message(join_error.into_panic()))
            } else {
                ProbeError::failed("probe task was cancelled")
            };
            tracing::warn!(service = service_name, error = %error, "Probe task failed");
            HealthCheckResult::unhealthy(service_name, error.to_string(), start.elapsed())
        }
        Err(_elapsed) => {
            task.abort();
            tracing::debug!(
                service = service_name,
                timeout_ms = timeout.as_millis() as u64,
                "Probe timed out"
            );
            HealthCheckResult::unhealthy(service_name, TIMEOUT_ERROR, timeout)
        }
    };

    metrics::histogram!("healthwatch_probe_duration_seconds",
        "service" => service_name.to_string()
    )
    .record(result.response_time_ms as f64 / 1000.0);

    result
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
