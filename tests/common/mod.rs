//! Shared test utilities for healthwatch integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use healthwatch::alert::{AlertError, AlertHandler, HealthAlert};
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Alert Handlers
// =============================================================================

/// Records every alert it receives, in delivery order.
#[derive(Default)]
pub struct RecordingHandler {
    alerts: Mutex<Vec<HealthAlert>>,
}

impl RecordingHandler {
    pub fn alerts(&self) -> Vec<HealthAlert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertHandler for RecordingHandler {
    async fn handle(&self, alert: &HealthAlert) -> Result<(), AlertError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Always fails.
pub struct FailingHandler;

#[async_trait]
impl AlertHandler for FailingHandler {
    async fn handle(&self, _alert: &HealthAlert) -> Result<(), AlertError> {
        Err(AlertError::Handler("webhook unreachable".to_string()))
    }
}

// =============================================================================
// Mock Servers
// =============================================================================

/// Replace all mocks on `server` with one answering `GET /health` with `status`.
pub async fn respond_health(server: &MockServer, status: u16) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Replace all mocks on `server` with a `GET /health` that answers 200 after `delay`.
pub async fn respond_health_slowly(server: &MockServer, delay: Duration) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(server)
        .await;
}

pub fn health_url(server: &MockServer) -> String {
    format!("{}/health", server.uri())
}
