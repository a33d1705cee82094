//! System-wide health aggregation.

use super::state::{HealthCheckResult, HealthStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Count of services per status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub unhealthy: usize,
    pub unknown: usize,
}

impl HealthSummary {
    pub fn from_results(results: &[HealthCheckResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.status {
                HealthStatus::Healthy => summary.healthy += 1,
                HealthStatus::Degraded => summary.degraded += 1,
                HealthStatus::Unhealthy => summary.unhealthy += 1,
                HealthStatus::Unknown => summary.unknown += 1,
            }
        }
        summary
    }

    /// Worst bucket with at least one member; `unknown` when nothing is healthy,
    /// degraded, or unhealthy.
    pub fn overall_status(&self) -> HealthStatus {
        if self.unhealthy > 0 {
            HealthStatus::Unhealthy
        } else if self.degraded > 0 {
            HealthStatus::Degraded
        } else if self.healthy > 0 {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unknown
        }
    }
}

/// Aggregate health derived on demand from every service's last result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub summary: HealthSummary,
    pub services: Vec<HealthCheckResult>,
    pub timestamp: DateTime<Utc>,
}

impl SystemHealth {
    pub fn from_results(services: Vec<HealthCheckResult>) -> Self {
        let summary = HealthSummary::from_results(&services);
        Self {
            status: summary.overall_status(),
            summary,
            services,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}
