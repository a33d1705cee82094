//! HTTP reachability probe.

use super::Probe;
use crate::health::{HealthCheckResult, HealthStatus, ProbeError};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Issues `GET url` and compares the response status against an expected code.
///
/// | Outcome                    | Status      |
/// |----------------------------|-------------|
/// | status == expected         | `healthy`   |
/// | any other status           | `degraded`  |
/// | transport error or timeout | `unhealthy` |
#[derive(Debug, Clone)]
pub struct HttpProbe {
    name: String,
    url: String,
    expected_status: u16,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            expected_status: 200,
            timeout: Duration::from_secs(5),
            client: reqwest::Client::new(),
        }
    }

    pub fn expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Per-request timeout applied by the HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a shared client (connection pooling, custom TLS, tests).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify_error(e: &reqwest::Error, timeout: Duration) -> String {
        if e.is_timeout() {
            format!("request timeout after {}ms", timeout.as_millis())
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            e.to_string()
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn evaluate(&self) -> Result<HealthCheckResult, ProbeError> {
        let start = Instant::now();

        let result = match self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => {
                let elapsed = start.elapsed();
                let code = response.status().as_u16();

                let result = if code == self.expected_status {
                    HealthCheckResult::new(&self.name, HealthStatus::Healthy, elapsed)
                } else {
                    HealthCheckResult::new(&self.name, HealthStatus::Degraded, elapsed).with_error(
                        format!(
                            "unexpected status code {} (expected {})",
                            code, self.expected_status
                        ),
                    )
                };
                result.with_metadata("status_code", code)
            }
            Err(e) => {
                let elapsed = start.elapsed();
                tracing::debug!(
                    service = %self.name,
                    url = %self.url,
                    error = %e,
                    "HTTP probe request failed"
                );
                HealthCheckResult::unhealthy(
                    &self.name,
                    Self::classify_error(&e, self.timeout),
                    elapsed,
                )
            }
        };

        let response_time_ms = result.response_time_ms;
        Ok(result
            .with_metadata("response_time_ms", response_time_ms)
            .with_metadata("url", self.url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_probe_defaults() {
        let probe = HttpProbe::new("api", "http://localhost:1");
        assert_eq!(probe.name(), "api");
        assert_eq!(probe.url(), "http://localhost:1");
        assert_eq!(probe.expected_status, 200);
        assert_eq!(probe.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_http_probe_builders() {
        let probe = HttpProbe::new("api", "http://localhost:1")
            .expected_status(204)
            .timeout(Duration::from_millis(250));
        assert_eq!(probe.expected_status, 204);
        assert_eq!(probe.timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_http_probe_connection_refused_is_unhealthy() {
        // Port 1 on loopback is reserved and never listening in test environments
        let probe = HttpProbe::new("api", "http://127.0.0.1:1/health")
            .timeout(Duration::from_secs(2));

        let result = probe.evaluate().await.unwrap();
        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert!(result.error.is_some());
        assert!(result.metadata.contains_key("response_time_ms"));
        assert!(!result.metadata.contains_key("status_code"));
    }
}
