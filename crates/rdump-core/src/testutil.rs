//! Shared fakes for unit tests: an in-memory object store and a dump
//! runner that writes canned bytes instead of shelling out.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::config::{
    ArchiveConfig, DatabaseConfig, RdumpConfig, RetentionConfig, ScheduleConfig, StorageConfig,
};
use crate::error::{RdumpError, Result};
use crate::producer::DumpRunner;
use crate::storage::{ObjectStore, RemoteObject};

/// In-memory [`ObjectStore`]. Uploads are stamped with an explicit test
/// clock so retention decisions stay deterministic.
pub struct MemoryStore {
    objects: Mutex<Vec<RemoteObject>>,
    deletes: Mutex<Vec<String>>,
    clock: Mutex<DateTime<Utc>>,
    pub fail_uploads: bool,
    pub fail_deletes: bool,
}

impl MemoryStore {
    pub fn new(clock: DateTime<Utc>) -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            clock: Mutex::new(clock),
            fail_uploads: false,
            fail_deletes: false,
        }
    }

    /// Seed an object as if it had been uploaded at `last_modified`.
    pub fn seed(&self, key: &str, last_modified: DateTime<Utc>) {
        self.objects.lock().unwrap().push(RemoteObject {
            key: key.to_string(),
            last_modified,
            size: Some(1024),
        });
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.key.clone())
            .collect()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().iter().any(|o| o.key == key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

impl ObjectStore for MemoryStore {
    fn put_file(&self, local: &Path, key: &str) -> Result<()> {
        if self.fail_uploads {
            return Err(RdumpError::Other(format!("simulated upload failure: {key}")));
        }
        let size = std::fs::metadata(local).ok().map(|m| m.len());
        let now = *self.clock.lock().unwrap();
        let mut objects = self.objects.lock().unwrap();
        objects.retain(|o| o.key != key);
        objects.push(RemoteObject {
            key: key.to_string(),
            last_modified: now,
            size,
        });
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<RemoteObject>> {
        let prefix = prefix.trim_matches('/');
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| prefix.is_empty() || o.key.starts_with(&format!("{prefix}/")))
            .cloned()
            .collect())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.fail_deletes {
            return Err(RdumpError::Other(format!("simulated delete failure: {key}")));
        }
        self.objects.lock().unwrap().retain(|o| o.key != key);
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// [`DumpRunner`] that writes fixed bytes to the destination path.
pub struct StubDump {
    pub payload: &'static [u8],
    pub fail: bool,
    produced: Mutex<Vec<std::path::PathBuf>>,
}

impl StubDump {
    pub fn new() -> Self {
        Self {
            payload: b"fake tarball",
            fail: false,
            produced: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn produced_paths(&self) -> Vec<std::path::PathBuf> {
        self.produced.lock().unwrap().clone()
    }
}

impl DumpRunner for StubDump {
    fn produce(&self, dest: &Path) -> Result<()> {
        if self.fail {
            return Err(RdumpError::Dump("simulated dump failure".into()));
        }
        std::fs::write(dest, self.payload)?;
        self.produced.lock().unwrap().push(dest.to_path_buf());
        Ok(())
    }
}

/// Minimal valid config pointing the archive at `archive_path`.
pub fn test_config(archive_path: &Path) -> RdumpConfig {
    RdumpConfig {
        database: DatabaseConfig::default(),
        archive: ArchiveConfig {
            path: archive_path.to_string_lossy().into_owned(),
        },
        storage: StorageConfig {
            backend: crate::config::StorageBackendKind::Local,
            bucket: None,
            project_id: None,
            credentials_file: None,
            root: Some("/tmp/rdump-test".to_string()),
            prefix: "rethinkdb".to_string(),
        },
        retention: RetentionConfig::default(),
        schedule: ScheduleConfig::default(),
    }
}
