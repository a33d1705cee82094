//! Watch command implementation

use crate::alert::{AlertHistoryHandler, FileAlertStore, LogAlertHandler};
use crate::cli::{load_config, WatchArgs};
use crate::config::AlertsConfig;
use crate::health::{HealthMonitor, MonitorHost};
use std::sync::Arc;

/// Register the alert handlers enabled in `[alerts]`. Returns how many were added.
pub fn install_alert_handlers(monitor: &HealthMonitor, alerts: &AlertsConfig) -> usize {
    let mut installed = 0;

    if alerts.log {
        monitor.register_alert_handler(Arc::new(LogAlertHandler));
        installed += 1;
    }

    if let Some(dir) = &alerts.history_dir {
        let store = Arc::new(FileAlertStore::new(dir.clone()));
        monitor.register_alert_handler(Arc::new(AlertHistoryHandler::with_limit(
            store,
            alerts.history_limit,
        )));
        tracing::info!(dir = %dir.display(), limit = alerts.history_limit, "Alert history enabled");
        installed += 1;
    }

    installed
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Handle `healthwatch watch`
pub async fn run_watch(args: &WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&args.config)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    crate::logging::init_tracing(&config.logging)?;

    let host = MonitorHost::new(config.check_defaults())?;
    let monitor = host.get();

    let handlers = install_alert_handlers(&monitor, &config.alerts);
    config.register_endpoints(&monitor)?;

    if monitor.endpoint_count() == 0 {
        tracing::warn!(config = %args.config.display(), "No endpoints configured");
    }
    tracing::info!(
        endpoints = monitor.endpoint_count(),
        alert_handlers = handlers,
        period_ms = monitor.scheduler_period().as_millis() as u64,
        "Starting health watch"
    );

    monitor.start();
    shutdown_signal().await;
    monitor.destroy();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_default_handlers() {
        let monitor = HealthMonitor::new();
        let installed = install_alert_handlers(&monitor, &AlertsConfig::default());
        assert_eq!(installed, 1);
        assert_eq!(monitor.alert_handler_count(), 1);
    }

    #[test]
    fn test_install_history_handler() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertsConfig {
            log: false,
            history_dir: Some(dir.path().to_path_buf()),
            history_limit: 10,
        };

        let monitor = HealthMonitor::new();
        assert_eq!(install_alert_handlers(&monitor, &alerts), 1);
        assert_eq!(monitor.alert_handler_count(), 1);
    }

    #[test]
    fn test_install_nothing() {
        let alerts = AlertsConfig {
            log: false,
            ..Default::default()
        };
        let monitor = HealthMonitor::new();
        assert_eq!(install_alert_handlers(&monitor, &alerts), 0);
    }
}
