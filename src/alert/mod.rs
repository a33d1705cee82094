//! Alert events and handler fan-out.
//!
//! Alerts are produced by the evaluator when an endpoint crosses its failure
//! threshold or recovers after alerting. The [`AlertDispatcher`] delivers each
//! alert to every registered [`AlertHandler`] concurrently; a handler that
//! errors or panics is logged and does not affect its siblings.

mod history;
mod logger;

pub use history::*;
pub use logger::LogAlertHandler;

use crate::health::{HealthCheckResult, HealthStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Whether an alert reports a failure or a recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Failure,
    Recovery,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Failure => "failure",
            AlertKind::Recovery => "recovery",
        }
    }
}

/// A failure-threshold crossing or a recovery for one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAlert {
    pub service_name: String,
    pub kind: AlertKind,
    pub status: HealthStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl HealthAlert {
    /// Alert for the evaluation that reached the failure threshold.
    pub fn failure(result: &HealthCheckResult, consecutive_failures: u32) -> Self {
        Self {
            service_name: result.service_name.clone(),
            kind: AlertKind::Failure,
            status: result.status,
            message: format!(
                "Service {} is {} after {} consecutive failed checks",
                result.service_name, result.status, consecutive_failures
            ),
            timestamp: Utc::now(),
            consecutive_failures,
            last_error: result.error.clone(),
        }
    }

    /// Alert for the first healthy result after a failure alert.
    pub fn recovery(result: &HealthCheckResult) -> Self {
        Self {
            service_name: result.service_name.clone(),
            kind: AlertKind::Recovery,
            status: HealthStatus::Healthy,
            message: format!("Service {} has recovered", result.service_name),
            timestamp: Utc::now(),
            consecutive_failures: 0,
            last_error: None,
        }
    }
}

/// Errors an alert handler can report.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert handler failed: {0}")]
    Handler(String),

    #[error("alert store error: {0}")]
    Store(String),

    #[error("alert serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("alert store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives alerts from the dispatcher.
#[async_trait]
pub trait AlertHandler: Send + Sync + 'static {
    /// Name used in logs when the handler fails.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn handle(&self, alert: &HealthAlert) -> Result<(), AlertError>;
}

/// Ordered collection of alert handlers.
#[derive(Default)]
pub struct AlertDispatcher {
    handlers: RwLock<Vec<Arc<dyn AlertHandler>>>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler. Handlers are never deduplicated.
    pub fn register(&self, handler: Arc<dyn AlertHandler>) {
        match self.handlers.write() {
            Ok(mut handlers) => handlers.push(handler),
            Err(poisoned) => {
                tracing::warn!("Alert handler list poisoned in register, recovering");
                poisoned.into_inner().push(handler);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registered handler.
    pub fn clear(&self) {
        match self.handlers.write() {
            Ok(mut handlers) => handlers.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn AlertHandler>> {
        match self.handlers.read() {
            Ok(handlers) => handlers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Deliver `alert` to all handlers concurrently and wait for them to settle.
    ///
    /// Returns the number of handlers that failed or panicked.
    pub async fn dispatch(&self, alert: &HealthAlert) -> usize {
        let handlers = self.snapshot();
        if handlers.is_empty() {
            return 0;
        }

        let names: Vec<String> = handlers.iter().map(|h| h.name().to_string()).collect();
        let tasks = handlers.into_iter().map(|handler| {
            let alert = alert.clone();
            tokio::spawn(async move { handler.handle(&alert).await })
        });
        let outcomes = futures::future::join_all(tasks).await;

        let mut failed = 0;
        for (name, outcome) in names.iter().zip(outcomes) {
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(join_error) => format!("handler task aborted: {}", join_error),
            };
            failed += 1;
            metrics::counter!("healthwatch_handler_failures_total",
                "handler" => name.clone()
            )
            .increment(1);
            tracing::warn!(
                handler = %name,
                service = %alert.service_name,
                error = %error,
                "Alert handler failed"
            );
        }
        failed
    }
}
