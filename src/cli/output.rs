//! Output formatting helpers for CLI commands

use crate::alert::{AlertKind, HealthAlert};
use crate::health::{HealthStatus, SystemHealth};
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;
use std::fmt::Write;

fn colored_status(status: HealthStatus) -> ColoredString {
    match status {
        HealthStatus::Healthy => "Healthy".green(),
        HealthStatus::Degraded => "Degraded".yellow(),
        HealthStatus::Unhealthy => "Unhealthy".red(),
        HealthStatus::Unknown => "Unknown".dimmed(),
    }
}

/// Get status icon for a health status
pub fn status_icon(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "✓",
        HealthStatus::Degraded => "~",
        HealthStatus::Unhealthy => "✗",
        HealthStatus::Unknown => "?",
    }
}

/// Format system health as a summary line followed by a per-service table
pub fn format_health_table(health: &SystemHealth) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} Overall: {} ({}/{} healthy)",
        status_icon(health.status),
        colored_status(health.status),
        health.summary.healthy,
        health.summary.total
    );

    if health.services.is_empty() {
        let _ = writeln!(output, "No services checked.");
        return output;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Service", "Status", "Response", "Error"]);

    for result in &health.services {
        table.add_row(vec![
            Cell::new(&result.service_name),
            Cell::new(colored_status(result.status).to_string()),
            Cell::new(format!("{}ms", result.response_time_ms)),
            Cell::new(result.error.as_deref().unwrap_or("-")),
        ]);
    }

    let _ = write!(output, "{}", table);
    output
}

/// Format system health as JSON
pub fn format_health_json(health: &SystemHealth) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(health)
}

/// Format alert history as a table, oldest first
pub fn format_alerts_table(alerts: &[HealthAlert]) -> String {
    if alerts.is_empty() {
        return "No alerts recorded.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Service", "Kind", "Status", "Message"]);

    for alert in alerts {
        let kind = match alert.kind {
            AlertKind::Failure => "failure".red(),
            AlertKind::Recovery => "recovery".green(),
        };
        table.add_row(vec![
            Cell::new(alert.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(&alert.service_name),
            Cell::new(kind.to_string()),
            Cell::new(colored_status(alert.status).to_string()),
            Cell::new(&alert.message),
        ]);
    }

    table.to_string()
}

/// Format alert history as JSON
pub fn format_alerts_json(alerts: &[HealthAlert]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "alerts": alerts }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthCheckResult;
    use std::time::Duration;

    fn sample_health() -> SystemHealth {
        SystemHealth::from_results(vec![
            HealthCheckResult::new("api", HealthStatus::Healthy, Duration::from_millis(12)),
            HealthCheckResult::unhealthy("db", "connection refused", Duration::from_millis(3)),
        ])
    }

    #[test]
    fn test_format_health_table_lists_services() {
        colored::control::set_override(false);
        let output = format_health_table(&sample_health());
        assert!(output.contains("Overall: Unhealthy (1/2 healthy)"));
        assert!(output.contains("api"));
        assert!(output.contains("12ms"));
        assert!(output.contains("connection refused"));
    }

    #[test]
    fn test_format_health_table_empty() {
        let output = format_health_table(&SystemHealth::from_results(vec![]));
        assert!(output.contains("No services checked."));
    }

    #[test]
    fn test_format_health_json_structure() {
        let json = format_health_json(&sample_health()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["status"], "unhealthy");
        assert_eq!(parsed["summary"]["total"], 2);
        assert_eq!(parsed["services"][1]["error"], "connection refused");
    }

    #[test]
    fn test_format_alerts_empty() {
        assert_eq!(format_alerts_table(&[]), "No alerts recorded.");
    }

    #[test]
    fn test_format_alerts_json_structure() {
        let result = HealthCheckResult::unhealthy("db", "down", Duration::from_millis(1));
        let alerts = vec![HealthAlert::failure(&result, 3)];
        let json = format_alerts_json(&alerts).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["alerts"][0]["service_name"], "db");
        assert_eq!(parsed["alerts"][0]["kind"], "failure");
        assert_eq!(parsed["alerts"][0]["consecutive_failures"], 3);
    }

    #[test]
    fn test_status_icons() {
        assert_eq!(status_icon(HealthStatus::Healthy), "✓");
        assert_eq!(status_icon(HealthStatus::Unhealthy), "✗");
    }
}
