//! Health monitoring core.
//!
//! [`HealthMonitor`] owns the endpoint registry, runs probe rounds (on demand
//! or on a repeating timer), tracks each endpoint's failure/recovery state,
//! and hands alerts to the [`AlertDispatcher`].
//!
//! # Data Flow
//! ```text
//! start() ── tick ──► perform_health_checks()
//!                        ├─► evaluate_probe(a) ─► apply_result(a) ─► dispatch(alert)?
//!                        ├─► evaluate_probe(b) ─► apply_result(b)
//!                        └─► ...                  (all endpoints concurrently)
//!
//! get_system_health() ◄── last result of every endpoint
//! ```

mod config;
mod endpoint;
mod error;
mod evaluator;
mod host;
mod state;
mod summary;


pub use config::*;
pub use endpoint::{EndpointRegistration, EndpointSnapshot};
pub use error::*;
pub use evaluator::{evaluate_probe, TIMEOUT_ERROR};
pub use host::MonitorHost;
pub use state::*;
pub use summary::*;

use crate::alert::{AlertDispatcher, AlertHandler, HealthAlert};
use crate::probe::Probe;
use dashmap::DashMap;
use endpoint::Endpoint;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

struct SchedulerHandle {
    cancel: CancellationToken,
    // Detached on stop(); kept so is_running() can tell a finished loop apart
    task: JoinHandle<()>,
}

/// Registers probes, runs them, tracks state, and fans out alerts.
///
/// # Example
///
/// ```
/// use healthwatch::health::{EndpointRegistration, HealthMonitor, HealthStatus};
/// use healthwatch::probe;
///
/// # #[tokio::main]
/// # async fn main() {
/// let monitor = HealthMonitor::new();
/// monitor
///     .register_endpoint(EndpointRegistration::new(
///         "cache",
///         probe::capability("cache", || async { Ok::<_, String>(true) }),
///     ))
///     .unwrap();
///
/// let results = monitor.perform_health_checks().await;
/// assert_eq!(results.len(), 1);
/// assert_eq!(monitor.get_system_health().status, HealthStatus::Healthy);
/// # }
/// ```
pub struct HealthMonitor {
    /// Base config every registration is merged over
    defaults: CheckConfig,
    endpoints: DashMap<String, Endpoint>,
    dispatcher: AlertDispatcher,
    next_generation: AtomicU64,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMonitor {
    /// Create a monitor using the default check config (30s / 5s / 3).
    pub fn new() -> Self {
        Self::build(CheckConfig::default())
    }

    /// Create a monitor with custom process-wide defaults.
    ///
    /// # Errors
    ///
    /// Returns `HealthError::InvalidConfig` if `defaults` is out of range.
    pub fn with_defaults(defaults: CheckConfig) -> Result<Self, HealthError> {
        defaults.validate()?;
        Ok(Self::build(defaults))
    }

    fn build(defaults: CheckConfig) -> Self {
        Self {
            defaults,
            endpoints: DashMap::new(),
            dispatcher: AlertDispatcher::new(),
            next_generation: AtomicU64::new(0),
            scheduler: Mutex::new(None),
        }
    }

    pub fn defaults(&self) -> CheckConfig {
        self.defaults
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register (or replace) an endpoint.
    ///
    /// The registration's config overlay is merged over the monitor defaults
    /// and validated. Re-registering an existing name replaces the probe and
    /// config and resets running state.
    ///
    /// # Errors
    ///
    /// Returns `HealthError::InvalidName` for an empty name and
    /// `HealthError::InvalidConfig` for out-of-range config values.
    pub fn register_endpoint(&self, registration: EndpointRegistration) -> Result<(), HealthError> {
        let EndpointRegistration {
            name,
            url,
            probe,
            config: patch,
        } = registration;

        if name.trim().is_empty() {
            return Err(HealthError::InvalidName(name));
        }

        let config = self.defaults.merge(&patch);
        config.validate()?;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let replaced = self
            .endpoints
            .insert(
                name.clone(),
                Endpoint {
                    url,
                    probe,
                    config,
                    state: EndpointState::default(),
                    generation,
                },
            )
            .is_some();

        tracing::info!(
            service = %name,
            replaced,
            interval_ms = config.interval.as_millis() as u64,
            timeout_ms = config.timeout.as_millis() as u64,
            alert_threshold = config.alert_threshold,
            "Registered health endpoint"
        );
        Ok(())
    }

    /// Remove an endpoint. Returns `false` if the name was unknown.
    pub fn remove_endpoint(&self, name: &str) -> bool {
        let removed = self.endpoints.remove(name).is_some();
        if removed {
            tracing::info!(service = name, "Removed health endpoint");
        }
        removed
    }

    /// Merge `patch` into a live endpoint's config.
    ///
    /// Returns `Ok(false)` without doing anything if the name is unknown.
    /// The failure count is preserved. If a raised threshold is now above the
    /// count, the alerting latch is cleared (see [`EndpointState::reconcile`]).
    ///
    /// # Errors
    ///
    /// Returns `HealthError::InvalidConfig` if the merged config is out of range;
    /// the existing config is left unchanged.
    pub fn update_endpoint_config(
        &self,
        name: &str,
        patch: CheckConfigPatch,
    ) -> Result<bool, HealthError> {
        let Some(mut endpoint) = self.endpoints.get_mut(name) else {
            return Ok(false);
        };

        let merged = endpoint.config.merge(&patch);
        merged.validate()?;
        endpoint.config = merged;
        endpoint.state.reconcile(&merged);

        tracing::debug!(service = name, config = ?merged, "Updated endpoint config");
        Ok(true)
    }

    /// Snapshot of one endpoint's config and running state.
    pub fn endpoint(&self, name: &str) -> Option<EndpointSnapshot> {
        self.endpoints
            .get(name)
            .map(|entry| EndpointSnapshot::from_endpoint(entry.key(), entry.value()))
    }

    /// Registered endpoint names, sorted.
    pub fn endpoint_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.endpoints.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Last result for `name`, or `None` if unknown or never evaluated.
    pub fn get_service_health(&self, name: &str) -> Option<HealthCheckResult> {
        self.endpoints
            .get(name)
            .and_then(|entry| entry.state.last_result.clone())
    }

    /// Last result of every evaluated endpoint, sorted by service name.
    pub fn get_all_service_health(&self) -> Vec<HealthCheckResult> {
        let mut results: Vec<(String, HealthCheckResult)> = self
            .endpoints
            .iter()
            .filter_map(|entry| {
                entry
                    .state
                    .last_result
                    .clone()
                    .map(|result| (entry.key().clone(), result))
            })
            .collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results.into_iter().map(|(_, result)| result).collect()
    }

    // ========================================================================
    // Alerts
    // ========================================================================

    /// Append an alert handler.
    pub fn register_alert_handler(&self, handler: Arc<dyn AlertHandler>) {
        self.dispatcher.register(handler);
    }

    pub fn alert_handler_count(&self) -> usize {
        self.dispatcher.len()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Evaluate every registered endpoint concurrently.
    ///
    /// Always returns one result per endpoint present when the round started,
    /// ordered by service name. Individual probe failures never fail the round.
    pub async fn perform_health_checks(&self) -> Vec<HealthCheckResult> {
        let mut targets: Vec<(String, Arc<dyn Probe>, CheckConfig, u64)> = self
            .endpoints
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    Arc::clone(&entry.probe),
                    entry.config,
                    entry.generation,
                )
            })
            .collect();
        targets.sort_by(|a, b| a.0.cmp(&b.0));

        let evaluations = targets
            .into_iter()
            .map(|(name, probe, config, generation)| {
                self.evaluate_endpoint(name, probe, config, generation)
            });
        futures::future::join_all(evaluations).await
    }

    /// Evaluate a single endpoint now. Returns `None` if the name is unknown.
    pub async fn check_endpoint(&self, name: &str) -> Option<HealthCheckResult> {
        let (probe, config, generation) = {
            let entry = self.endpoints.get(name)?;
            (Arc::clone(&entry.probe), entry.config, entry.generation)
        };
        Some(
            self.evaluate_endpoint(name.to_string(), probe, config, generation)
                .await,
        )
    }

    async fn evaluate_endpoint(
        &self,
        name: String,
        probe: Arc<dyn Probe>,
        config: CheckConfig,
        generation: u64,
    ) -> HealthCheckResult {
        let result = evaluate_probe(&name, probe, config.timeout).await;

        if let Some(alert) = self.apply_result(&name, generation, result.clone()) {
            metrics::counter!("healthwatch_alerts_total",
                "service" => alert.service_name.clone(),
                "kind" => alert.kind.as_str()
            )
            .increment(1);

            let failed = self.dispatcher.dispatch(&alert).await;
            if failed > 0 {
                tracing::debug!(service = %name, failed, "Some alert handlers failed");
            }
        }

        result
    }

    /// Fold `result` into the endpoint's state if it still belongs to the
    /// registration that produced it.
    fn apply_result(
        &self,
        name: &str,
        generation: u64,
        result: HealthCheckResult,
    ) -> Option<HealthAlert> {
        let mut entry = self.endpoints.get_mut(name)?;
        if entry.generation != generation {
            tracing::debug!(service = name, "Discarding result from superseded registration");
            return None;
        }

        let endpoint = &mut *entry;
        let old_status = endpoint.state.last_result.as_ref().map(|r| r.status);
        let new_status = result.status;
        let alert = endpoint.state.apply_result(result, &endpoint.config);

        if old_status != Some(new_status) {
            tracing::info!(
                service = name,
                old_status = ?old_status,
                new_status = %new_status,
                consecutive_failures = endpoint.state.consecutive_failures,
                "Service status changed"
            );
        }
        alert
    }

    // ========================================================================
    // Scheduler
    // ========================================================================

    /// Timer period used by [`start`](Self::start): the smallest interval among
    /// registered endpoints, or the default interval when none are registered.
    pub fn scheduler_period(&self) -> Duration {
        self.endpoints
            .iter()
            .map(|entry| entry.config.interval)
            .min()
            .unwrap_or(self.defaults.interval)
    }

    fn scheduler_slot(&self) -> MutexGuard<'_, Option<SchedulerHandle>> {
        match self.scheduler.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Scheduler lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Start periodic checking: one immediate round, then one round per tick.
    ///
    /// Returns `false` (and does nothing) if already running. Must be called
    /// from within a Tokio runtime. The background task only holds a weak
    /// reference; it ends once every `Arc` to the monitor is dropped.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut slot = self.scheduler_slot();
        if slot.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            return false;
        }

        let period = self.scheduler_period();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let monitor = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(period_ms = period.as_millis() as u64, "Health monitor started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Health monitor stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        let Some(monitor) = monitor.upgrade() else {
                            break;
                        };
                        let results = monitor.perform_health_checks().await;
                        tracing::debug!(
                            services_checked = results.len(),
                            "Health check round completed"
                        );
                    }
                }
            }
        });

        *slot = Some(SchedulerHandle { cancel, task });
        true
    }

    /// Stop scheduling future rounds. In-flight evaluations still complete.
    ///
    /// Returns `false` if the scheduler was not running.
    pub fn stop(&self) -> bool {
        match self.scheduler_slot().take() {
            Some(handle) => {
                handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler_slot()
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Stop the scheduler and drop every endpoint and alert handler.
    pub fn destroy(&self) {
        self.stop();
        self.endpoints.clear();
        self.dispatcher.clear();
        tracing::info!("Health monitor destroyed");
    }

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Aggregate status over every evaluated endpoint.
    pub fn get_system_health(&self) -> SystemHealth {
        SystemHealth::from_results(self.get_all_service_health())
    }

    pub fn is_system_healthy(&self) -> bool {
        self.get_system_health().is_healthy()
    }

    /// `false` for unknown or never-evaluated services.
    pub fn is_service_healthy(&self, name: &str) -> bool {
        self.get_service_health(name)
            .is_some_and(|result| result.status.is_healthy())
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        let slot = match self.scheduler.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = slot.take() {
            handle.cancel.cancel();
        }
    }
}
