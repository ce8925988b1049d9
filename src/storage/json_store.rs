//! JSON-based scan log storage.
//!
//! Stores each scan log as a separate JSON file named after its scan ID.
//! Supports listing, lookup by short ID and pruning.

use super::ScanLogSink;
use crate::discovery::ScanLog;
use crate::error::{StorageError, StorageResult};
use crate::types::ScanId;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON file-based scan log store.
#[derive(Debug, Clone)]
pub struct JsonLogStore {
    dir: PathBuf,
}

impl JsonLogStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a scan log.
    pub fn save(&self, log: &ScanLog) -> StorageResult<()> {
        let file = self.log_file(&log.scan_id);
        let content = serde_json::to_string_pretty(log)?;

        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Load a scan log by ID.
    pub fn load(&self, id: &ScanId) -> StorageResult<ScanLog> {
        let file = self.log_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a scan log by short ID prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<ScanLog> {
        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.to_string().starts_with(prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(StorageError::ScanNotFound(prefix.to_string())),
            [id] => self.load(id),
            _ => Err(StorageError::LoadFailed(format!(
                "ambiguous prefix '{}': {} matches",
                prefix,
                matches.len()
            ))),
        }
    }

    /// List all stored scan IDs.
    pub fn list_ids(&self) -> StorageResult<Vec<ScanId>> {
        let mut ids = Vec::new();

        for entry in
            fs::read_dir(&self.dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    if let Ok(id) = stem.to_string_lossy().parse::<ScanId>() {
                        ids.push(id);
                    }
                }
            }
        }

        Ok(ids)
    }

    /// Load every readable log, newest first.
    pub fn load_all(&self) -> StorageResult<Vec<ScanLog>> {
        let mut logs = Vec::new();

        for id in self.list_ids()? {
            match self.load(&id) {
                Ok(log) => logs.push(log),
                Err(e) => debug!(scan_id = %id, error = %e, "Skipping unreadable scan log"),
            }
        }

        logs.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(logs)
    }

    /// Delete a scan log.
    pub fn delete(&self, id: &ScanId) -> StorageResult<()> {
        let file = self.log_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        fs::remove_file(&file).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Delete logs of scans started more than `max_age` ago.
    pub fn prune(&self, max_age: chrono::Duration) -> StorageResult<usize> {
        let cutoff = Utc::now() - max_age;
        let mut deleted = 0;

        for log in self.load_all()? {
            if log.started_at < cutoff {
                self.delete(&log.scan_id)?;
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    fn log_file(&self, id: &ScanId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl ScanLogSink for JsonLogStore {
    fn name(&self) -> &'static str {
        "json"
    }

    fn append(&self, log: &ScanLog) -> StorageResult<()> {
        self.save(log)
    }

    fn list(&self) -> StorageResult<Vec<ScanLog>> {
        self.load_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddressRange, PortList};

    fn sample_log(age_days: i64) -> ScanLog {
        let started_at = Utc::now() - chrono::Duration::days(age_days);
        ScanLog {
            scan_id: ScanId::new(),
            ip_range: AddressRange::parse("192.0.2.0/30").unwrap(),
            ports: PortList::default(),
            total_targets: 2,
            discovered: 1,
            started_at,
            completed_at: started_at + chrono::Duration::milliseconds(1500),
            cancelled: false,
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLogStore::open(dir.path()).unwrap();
        let log = sample_log(0);

        store.save(&log).unwrap();
        assert_eq!(store.load(&log.scan_id).unwrap(), log);
        assert_eq!(store.find_by_prefix(&log.scan_id.short()).unwrap(), log);
    }

    #[test]
    fn test_load_all_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLogStore::open(dir.path()).unwrap();
        let old = sample_log(3);
        let new = sample_log(0);
        store.save(&old).unwrap();
        store.save(&new).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let logs = store.load_all().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].scan_id, new.scan_id);
    }

    #[test]
    fn test_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLogStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load(&ScanId::new()),
            Err(StorageError::ScanNotFound(_))
        ));
        assert!(store.find_by_prefix("deadbeef").is_err());
    }

    #[test]
    fn test_prune() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLogStore::open(dir.path()).unwrap();
        store.save(&sample_log(10)).unwrap();
        store.save(&sample_log(0)).unwrap();

        assert_eq!(store.prune(chrono::Duration::days(7)).unwrap(), 1);
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_removed_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scans");
        let store = JsonLogStore::open(&path).unwrap();
        fs::remove_dir_all(&path).unwrap();

        assert!(store.append(&sample_log(0)).is_err());
        assert!(ScanLogSink::list(&store).is_err());
    }
}
