//! Alert handler that writes structured log events.

use super::{AlertError, AlertHandler, AlertKind, HealthAlert};
use async_trait::async_trait;

/// Emits every alert as a `tracing` event: failures at `warn`, recoveries at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertHandler;

#[async_trait]
impl AlertHandler for LogAlertHandler {
    fn name(&self) -> &str {
        "log"
    }

    async fn handle(&self, alert: &HealthAlert) -> Result<(), AlertError> {
        match alert.kind {
            AlertKind::Failure => tracing::warn!(
                service = %alert.service_name,
                status = %alert.status,
                consecutive_failures = alert.consecutive_failures,
                last_error = alert.last_error.as_deref().unwrap_or(""),
                "{}",
                alert.message
            ),
            AlertKind::Recovery => tracing::info!(
                service = %alert.service_name,
                status = %alert.status,
                "{}",
                alert.message
            ),
        }
        Ok(())
    }
}
