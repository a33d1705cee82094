//! Bounded alert history persisted through a key/value store.

use super::{AlertError, AlertHandler, HealthAlert};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Maximum number of alerts kept by [`AlertHistoryHandler`] by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Store key under which the alert history is saved.
pub const ALERT_HISTORY_KEY: &str = "health_alerts";

/// Minimal string key/value store used to persist alert history.
#[async_trait]
pub trait AlertStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, AlertError>;
    async fn set(&self, key: &str, value: String) -> Result<(), AlertError>;
}

/// In-process store, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    entries: DashMap<String, String>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AlertError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AlertError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes are atomic per key but there is no cross-process or cross-instance
/// locking. Point at most one [`AlertHistoryHandler`] at a given directory.
#[derive(Debug, Clone)]
pub struct FileAlertStore {
    dir: PathBuf,
}

impl FileAlertStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AlertError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AlertError::Store(format!("invalid store key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl AlertStore for FileAlertStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AlertError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AlertError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write to a sibling temp file, then rename into place
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Read the alert history saved in `store`, oldest first.
pub async fn load_alert_history(store: &dyn AlertStore) -> Result<Vec<HealthAlert>, AlertError> {
    match store.get(ALERT_HISTORY_KEY).await? {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Vec::new()),
    }
}

/// Appends every alert to a ring buffer of the most recent `limit` alerts.
///
/// Concurrent alerts delivered to the same handler are applied one at a time.
/// Two handlers sharing one store do not coordinate, and interleaved
/// read-modify-write cycles between them can drop entries; share a single
/// handler instead (it is cheap to wrap in `Arc` and register once).
pub struct AlertHistoryHandler {
    store: Arc<dyn AlertStore>,
    limit: usize,
    // Serializes this handler's read-modify-write cycles
    write_lock: Mutex<()>,
}

impl AlertHistoryHandler {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self::with_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(store: Arc<dyn AlertStore>, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Stored alerts, oldest first.
    pub async fn history(&self) -> Result<Vec<HealthAlert>, AlertError> {
        load_alert_history(self.store.as_ref()).await
    }
}

#[async_trait]
impl AlertHandler for AlertHistoryHandler {
    fn name(&self) -> &str {
        "history"
    }

    async fn handle(&self, alert: &HealthAlert) -> Result<(), AlertError> {
        let _guard = self.write_lock.lock().await;

        let mut alerts: VecDeque<HealthAlert> = self.history().await?.into();
        alerts.push_back(alert.clone());
        while alerts.len() > self.limit {
            alerts.pop_front();
        }

        let raw = serde_json::to_string(&alerts)?;
        self.store.set(ALERT_HISTORY_KEY, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use crate::health::HealthStatus;
    use chrono::Utc;

    fn make_alert(service: &str, failures: u32) -> HealthAlert {
        HealthAlert {
            service_name: service.to_string(),
            kind: AlertKind::Failure,
            status: HealthStatus::Unhealthy,
            message: format!("{} down", service),
            timestamp: Utc::now(),
            consecutive_failures: failures,
            last_error: Some("boom".to_string()),
        }
    }

    #[tokio::test]
    async fn test_history_starts_empty() {
        let handler = AlertHistoryHandler::new(Arc::new(MemoryAlertStore::new()));
        assert!(handler.history().await.unwrap().is_empty());
        assert_eq!(handler.limit(), DEFAULT_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn test_history_appends_in_order() {
        let handler = AlertHistoryHandler::new(Arc::new(MemoryAlertStore::new()));
        handler.handle(&make_alert("a", 1)).await.unwrap();
        handler.handle(&make_alert("b", 2)).await.unwrap();

        let history = handler.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].service_name, "a");
        assert_eq!(history[1].service_name, "b");
    }

    #[tokio::test]
    async fn test_history_keeps_only_most_recent() {
        let handler = AlertHistoryHandler::with_limit(Arc::new(MemoryAlertStore::new()), 3);
        for i in 0..5 {
            handler.handle(&make_alert(&format!("svc-{}", i), i)).await.unwrap();
        }

        let history = handler.history().await.unwrap();
        let names: Vec<_> = history.iter().map(|a| a.service_name.as_str()).collect();
        assert_eq!(names, vec!["svc-2", "svc-3", "svc-4"]);
    }

    #[tokio::test]
    async fn test_default_limit_is_one_hundred() {
        let handler = AlertHistoryHandler::new(Arc::new(MemoryAlertStore::new()));
        for i in 0..105 {
            handler.handle(&make_alert("svc", i)).await.unwrap();
        }

        let history = handler.history().await.unwrap();
        assert_eq!(history.len(), 100);
        assert_eq!(history[0].consecutive_failures, 5);
        assert_eq!(history[99].consecutive_failures, 104);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAlertStore::new(dir.path().join("nested"));

        assert!(store.get("health_alerts").await.unwrap().is_none());
        store.set("health_alerts", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("health_alerts").await.unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested").join("health_alerts.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAlertStore::new(dir.path());

        assert!(matches!(store.get("../etc").await, Err(AlertError::Store(_))));
        assert!(matches!(store.set("", String::new()).await, Err(AlertError::Store(_))));
    }

    #[tokio::test]
    async fn test_corrupt_history_is_reported() {
        let store = Arc::new(MemoryAlertStore::new());
        store.set(ALERT_HISTORY_KEY, "not json".to_string()).await.unwrap();

        let handler = AlertHistoryHandler::new(store);
        let result = handler.handle(&make_alert("svc", 1)).await;
        assert!(matches!(result, Err(AlertError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_concurrent_alerts_on_one_handler_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let handler = Arc::new(AlertHistoryHandler::new(Arc::new(FileAlertStore::new(
            dir.path(),
        ))));

        let tasks = (0..20).map(|i| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move { handler.handle(&make_alert(&format!("svc-{}", i), i)).await })
        });
        for outcome in futures::future::join_all(tasks).await {
            outcome.unwrap().unwrap();
        }

        assert_eq!(handler.history().await.unwrap().len(), 20);
    }
}
