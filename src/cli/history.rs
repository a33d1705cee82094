//! History command implementation

use crate::alert::{load_alert_history, FileAlertStore};
use crate::cli::output::{format_alerts_json, format_alerts_table};
use crate::cli::{load_config, HistoryArgs};

/// Handle `healthwatch history`
pub async fn run_history(args: &HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let Some(dir) = config.alerts.history_dir else {
        return Err("alert history is not configured (set alerts.history_dir)".into());
    };

    let store = FileAlertStore::new(dir);
    let alerts = load_alert_history(&store).await?;

    let output = if args.json {
        format_alerts_json(&alerts)?
    } else {
        format_alerts_table(&alerts)
    };
    println!("{}", output);
    Ok(())
}
