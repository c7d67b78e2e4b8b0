use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Flat-file substitute used when the primary database is unreachable.
///
/// The file holds one JSON array; append is a whole-file read-modify-write
/// with no locking. Concurrent writers may race and lose updates - accepted,
/// not mitigated, in scope.
#[derive(Debug, Clone)]
pub struct FallbackStore {
    path: PathBuf,
}

impl FallbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored array. A missing or corrupt file is an empty
    /// collection, not an error.
    pub fn load(&self) -> Vec<serde_json::Value> {
        read_json_array(&self.path)
    }

    /// Append one fully-formed record and rewrite the whole file.
    pub fn append(&self, record: serde_json::Value) -> Result<()> {
        let mut records = self.load();
        records.push(record);
        write_json_array(&self.path, &records)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub timestamp: DateTime<Utc>,
    pub to_email: String,
    pub subject: String,
    pub success: bool,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailStats {
    pub total_emails: usize,
    pub successful_emails: usize,
    pub failed_emails: usize,
    pub success_rate: f64,
    pub recent_activity: Vec<EmailLogEntry>,
}

/// Append-only log of email send attempts, trimmed to the most recent
/// `MAX_ENTRIES` on every write.
#[derive(Debug, Clone)]
pub struct EmailLog {
    path: PathBuf,
}

const MAX_ENTRIES: usize = 1000;

impl EmailLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Vec<EmailLogEntry> {
        read_json_array(&self.path)
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }

    /// Record one attempt. Logging must never fail a send, so errors are
    /// swallowed with a warning.
    pub fn record(&self, entry: EmailLogEntry) {
        let mut entries = self.load();
        entries.push(entry);
        if entries.len() > MAX_ENTRIES {
            entries = entries.split_off(entries.len() - MAX_ENTRIES);
        }
        let values: Vec<serde_json::Value> = entries
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect();
        if let Err(e) = write_json_array(&self.path, &values) {
            warn!("failed to write email log {}: {}", self.path.display(), e);
        }
    }

    pub fn stats(&self) -> EmailStats {
        let entries = self.load();
        let total = entries.len();
        let successful = entries.iter().filter(|e| e.success).count();
        let recent_start = entries.len().saturating_sub(10);
        EmailStats {
            total_emails: total,
            successful_emails: successful,
            failed_emails: total - successful,
            success_rate: if total > 0 {
                successful as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            recent_activity: entries[recent_start..].to_vec(),
        }
    }
}

fn read_json_array(path: &Path) -> Vec<serde_json::Value> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(values) => values,
        Err(e) => {
            warn!("treating corrupt file {} as empty: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn write_json_array(path: &Path, values: &[serde_json::Value]) -> Result<()> {
    let body = serde_json::to_string_pretty(values).context("serialize records")?;
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rescueradar-{}-{}.json", tag, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = FallbackStore::new(temp_path("missing"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{not valid json").unwrap();
        let store = FallbackStore::new(&path);
        assert!(store.load().is_empty());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_each_append_adds_exactly_one_record() {
        let path = temp_path("append");
        std::fs::write(&path, r#"[{"id": "seed"}]"#).unwrap();
        let store = FallbackStore::new(&path);
        let initial = store.load().len();

        for i in 0..3 {
            store
                .append(serde_json::json!({"id": format!("r-{}", i)}))
                .unwrap();
        }

        let records = store.load();
        assert_eq!(records.len(), initial + 3);
        assert_eq!(records[0]["id"], "seed");
        assert_eq!(records[3]["id"], "r-2");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_append_does_not_dedup() {
        let path = temp_path("dup");
        let store = FallbackStore::new(&path);
        let record = serde_json::json!({"id": "same"});
        store.append(record.clone()).unwrap();
        store.append(record).unwrap();
        assert_eq!(store.load().len(), 2);
        std::fs::remove_file(&path).ok();
    }

    fn entry(success: bool) -> EmailLogEntry {
        EmailLogEntry {
            timestamp: Utc::now(),
            to_email: "a@b.co".into(),
            subject: "s".into(),
            success,
            method: "api".into(),
            message_id: None,
            error: None,
        }
    }

    #[test]
    fn test_email_log_caps_at_1000() {
        let path = temp_path("log");
        let log = EmailLog::new(&path);
        let mut entries: Vec<serde_json::Value> = Vec::new();
        for _ in 0..MAX_ENTRIES {
            entries.push(serde_json::to_value(entry(true)).unwrap());
        }
        write_json_array(&path, &entries).unwrap();

        log.record(entry(false));
        let loaded = log.load();
        assert_eq!(loaded.len(), MAX_ENTRIES);
        assert!(!loaded.last().unwrap().success);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_email_stats() {
        let path = temp_path("stats");
        let log = EmailLog::new(&path);
        log.record(entry(true));
        log.record(entry(true));
        log.record(entry(false));

        let stats = log.stats();
        assert_eq!(stats.total_emails, 3);
        assert_eq!(stats.successful_emails, 2);
        assert_eq!(stats.failed_emails, 1);
        assert!((stats.success_rate - 66.66).abs() < 1.0);
        assert_eq!(stats.recent_activity.len(), 3);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_email_stats_empty_log() {
        let log = EmailLog::new(temp_path("empty-stats"));
        let stats = log.stats();
        assert_eq!(stats.total_emails, 0);
        assert_eq!(stats.success_rate, 0.0);
    }
}
