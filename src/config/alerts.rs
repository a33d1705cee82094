//! Alert handler configuration

use crate::alert::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which alert handlers `watch` installs (`[alerts]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Emit alerts as log events
    pub log: bool,
    /// Directory for persisted alert history; history is off when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_dir: Option<PathBuf>,
    /// Most recent alerts kept in history
    pub history_limit: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            log: true,
            history_dir: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
