//! Caller-owned holder for the process's monitor instance.

use super::{CheckConfig, HealthError, HealthMonitor};
use std::sync::{Arc, RwLock};

/// Holds the one [`HealthMonitor`] a hosting process works with.
///
/// Construct it once at startup and pass it (or the `Arc<HealthMonitor>` from
/// [`get`](Self::get)) to whatever needs monitoring access.
/// [`reinitialize`](Self::reinitialize) swaps in a fresh monitor and tears the
/// previous one down.
pub struct MonitorHost {
    current: RwLock<Arc<HealthMonitor>>,
}

impl MonitorHost {
    /// # Errors
    ///
    /// Returns `HealthError::InvalidConfig` if `defaults` is out of range.
    pub fn new(defaults: CheckConfig) -> Result<Self, HealthError> {
        Ok(Self {
            current: RwLock::new(Arc::new(HealthMonitor::with_defaults(defaults)?)),
        })
    }

    /// The current monitor.
    pub fn get(&self) -> Arc<HealthMonitor> {
        match self.current.read() {
            Ok(current) => Arc::clone(&current),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the current monitor with a fresh one built from `defaults`.
    ///
    /// The previous monitor is destroyed (scheduler stopped, endpoints and
    /// handlers cleared). Holders of the old `Arc` keep a valid but empty
    /// monitor. On error the current monitor is left untouched.
    pub fn reinitialize(&self, defaults: CheckConfig) -> Result<Arc<HealthMonitor>, HealthError> {
        let fresh = Arc::new(HealthMonitor::with_defaults(defaults)?);

        let previous = {
            let mut current = match self.current.write() {
                Ok(current) => current,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::replace(&mut *current, Arc::clone(&fresh))
        };
        previous.destroy();

        tracing::info!("Health monitor reinitialized");
        Ok(fresh)
    }
}

impl Default for MonitorHost {
    fn default() -> Self {
        Self {
            current: RwLock::new(Arc::new(HealthMonitor::new())),
        }
    }
}
