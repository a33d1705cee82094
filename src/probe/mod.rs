//! Health probes.
//!
//! A [`Probe`] inspects one dependency and returns a [`HealthCheckResult`].
//! Three standard probes are provided:
//!
//! - [`HttpProbe`]: reachability of a URL, classified by response status
//! - [`DataStoreProbe`]: runs an arbitrary async test operation
//! - [`CapabilityProbe`]: maps a boolean check to healthy/degraded
//!
//! Anything else can be expressed with [`probe_fn`].
//!
//! # Example
//!
//! ```
//! use healthwatch::probe;
//! use std::time::Duration;
//!
//! let api = probe::http("api", "http://localhost:8080/health")
//!     .expected_status(204)
//!     .timeout(Duration::from_secs(2));
//! assert_eq!(api.url(), "http://localhost:8080/health");
//!
//! let cache = probe::capability("cache", || async { Ok::<_, std::io::Error>(true) });
//! # let _ = cache;
//! ```

mod capability;
mod data_store;
mod http;

pub use capability::CapabilityProbe;
pub use data_store::DataStoreProbe;
pub use http::HttpProbe;

use crate::health::{HealthCheckResult, ProbeError};
use async_trait::async_trait;
use std::future::Future;

/// Determines the health of one dependency.
///
/// Implementations should not enforce their own overall deadline; the
/// evaluator races every call against the endpoint's configured timeout.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn evaluate(&self) -> Result<HealthCheckResult, ProbeError>;
}

/// Probe backed by a closure returning a future.
pub struct FnProbe<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HealthCheckResult, ProbeError>> + Send + 'static,
{
    async fn evaluate(&self) -> Result<HealthCheckResult, ProbeError> {
        (self.f)().await
    }
}

/// Wrap a closure as a [`Probe`].
pub fn probe_fn<F, Fut>(f: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HealthCheckResult, ProbeError>> + Send + 'static,
{
    FnProbe { f }
}

/// HTTP reachability probe for `url`; expects status 200 within 5s unless configured.
pub fn http(name: impl Into<String>, url: impl Into<String>) -> HttpProbe {
    HttpProbe::new(name, url)
}

/// Probe that runs `operation`; success is healthy, an error is unhealthy.
pub fn data_store<F, Fut, E>(name: impl Into<String>, operation: F) -> DataStoreProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    DataStoreProbe::new(name, operation)
}

/// Probe that maps `check` to `true` = healthy, `false` = degraded, error = unhealthy.
pub fn capability<F, Fut, E>(name: impl Into<String>, check: F) -> CapabilityProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    CapabilityProbe::new(name, check)
}
