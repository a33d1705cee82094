//! CLI module for healthwatch
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `check` - Run one round of checks and print the result
//! - `watch` - Check continuously and emit alerts until interrupted
//! - `history` - Show persisted alert history
//! - `config` - Configuration utilities (init)
//!
//! # Example
//!
//! ```bash
//! # One-off check, failing the shell if anything is unhealthy
//! healthwatch check --strict
//!
//! # Continuous monitoring with JSON logs
//! HEALTHWATCH_LOG_FORMAT=json healthwatch watch -c /etc/healthwatch.toml
//! ```

pub mod check;
pub mod config;
pub mod history;
pub mod output;
pub mod watch;

pub use check::run_check;
pub use config::handle_config_init;
pub use history::run_history;
pub use watch::run_watch;

use crate::config::MonitorConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// healthwatch - service health monitoring
#[derive(Parser, Debug)]
#[command(
    name = "healthwatch",
    version,
    about = "Service health monitoring with failure and recovery alerts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one round of health checks
    Check(CheckArgs),
    /// Check continuously until interrupted
    Watch(WatchArgs),
    /// Show persisted alert history
    History(HistoryArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "healthwatch.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero unless the system is healthy
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "healthwatch.toml")]
    pub config: PathBuf,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "healthwatch.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "healthwatch.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

/// Load `path` (or defaults when it does not exist), apply `HEALTHWATCH_*`
/// overrides, and validate.
pub fn load_config(path: &Path) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        MonitorConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        MonitorConfig::default()
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
