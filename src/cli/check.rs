//! Check command implementation

use crate::cli::output::{format_health_json, format_health_table};
use crate::cli::{load_config, CheckArgs};
use crate::config::MonitorConfig;
use crate::health::{HealthMonitor, SystemHealth};

/// Register every configured endpoint, run a single round, and aggregate.
pub async fn check_once(config: &MonitorConfig) -> Result<SystemHealth, Box<dyn std::error::Error>> {
    let monitor = HealthMonitor::with_defaults(config.check_defaults())?;
    config.register_endpoints(&monitor)?;

    let results = monitor.perform_health_checks().await;
    tracing::debug!(services_checked = results.len(), "Check round completed");

    Ok(monitor.get_system_health())
}

/// Handle `healthwatch check`
pub async fn run_check(args: &CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let health = check_once(&config).await?;

    let output = if args.json {
        format_health_json(&health)?
    } else {
        format_health_table(&health)
    };
    println!("{}", output);

    if args.strict && !health.is_healthy() {
        return Err(format!("system is {}", health.status).into());
    }
    Ok(())
}
