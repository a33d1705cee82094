//! healthwatch - service health monitoring
//!
//! Registers health probes for the services an application depends on, runs
//! them on demand or on a timer, tracks consecutive failures per service, and
//! fans failure/recovery alerts out to pluggable handlers.
//!
//! The core lives in [`health`]; [`probe`] provides the standard probes and
//! [`alert`] the alert types and handlers.

pub mod alert;
pub mod cli;
pub mod config;
pub mod health;
pub mod logging;
pub mod probe;

pub use alert::{AlertHandler, HealthAlert};
pub use health::{
    CheckConfig, EndpointRegistration, HealthCheckResult, HealthMonitor, HealthStatus,
    MonitorHost, SystemHealth,
};
pub use probe::Probe;
