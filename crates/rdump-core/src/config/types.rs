use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RdumpConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl RdumpConfig {
    /// Reject configurations that would only fail once the daemon is
    /// already mid-cycle.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.schedule.every_duration()?;
        match self.retention.policy {
            RetentionKind::Count => {
                if self.retention.keep_last == 0 {
                    return Err(crate::error::RdumpError::Config(
                        "retention.keep_last must be at least 1".into(),
                    ));
                }
            }
            RetentionKind::Age => {
                crate::retention::parse_duration(&self.retention.max_age)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Host the dump command connects to.
    #[serde(default = "default_host")]
    pub host: String,
    /// TLS CA certificate path, passed through to the dump command.
    #[serde(default)]
    pub tls_ca: Option<String>,
    /// Driver password. When unset, the `RDUMP_PASSWORD` environment
    /// variable is consulted.
    #[serde(default)]
    pub password: Option<String>,
    /// External dump command (overridable mainly for tests).
    #[serde(default = "default_dump_command")]
    pub dump_command: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            tls_ca: None,
            password: None,
            dump_command: default_dump_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Local archive path. Overwritten in place every cycle.
    #[serde(default = "default_archive_path")]
    pub path: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            path: default_archive_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Cloud Storage bucket name (gcs backend).
    #[serde(default)]
    pub bucket: Option<String>,
    /// Cloud project id. Informational; logged at startup.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Service-account JSON key file. When unset, credentials are
    /// assembled from the `BACKUP_*` environment variables.
    #[serde(default)]
    pub credentials_file: Option<String>,
    /// Root directory (local backend).
    #[serde(default)]
    pub root: Option<String>,
    /// Key prefix all backup objects live under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Gcs,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    #[serde(default)]
    pub policy: RetentionKind,
    /// Count policy: number of most recent backups to keep.
    #[serde(default = "default_keep_last")]
    pub keep_last: usize,
    /// Age policy: delete backups strictly older than this (e.g. "30d", "48h").
    #[serde(default = "default_max_age")]
    pub max_age: String,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            policy: RetentionKind::default(),
            keep_last: default_keep_last(),
            max_age: default_max_age(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionKind {
    #[default]
    Count,
    Age,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Delay between cycles, measured from cycle completion.
    #[serde(default = "default_schedule_every")]
    pub every: String,
    /// Run the first cycle immediately at startup.
    #[serde(default = "default_on_startup")]
    pub on_startup: bool,
    #[serde(default)]
    pub jitter_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            every: default_schedule_every(),
            on_startup: default_on_startup(),
            jitter_seconds: 0,
        }
    }
}

impl ScheduleConfig {
    pub fn every_duration(&self) -> crate::error::Result<Duration> {
        super::defaults::parse_human_duration(&self.every)
    }
}
