//! A backup cycle end to end: dump, upload, prune.

pub mod scheduler;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::RdumpConfig;
use crate::error::Result;
use crate::producer::DumpRunner;
use crate::retention::RetentionPolicy;
use crate::storage::ObjectStore;

/// What a single cycle did, for logging and for the CLI exit summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Object key the archive was uploaded under.
    pub uploaded_key: String,
    /// Remote keys deleted by the retention pass.
    pub deleted_keys: Vec<String>,
    /// Keys the retention pass wanted gone but could not delete.
    pub failed_deletes: Vec<String>,
}

/// Object key for a backup taken at `ts`, e.g.
/// `rethinkdb/rethinkdb-dump-2024-03-01T12:00:00.tar.gz`.
pub fn backup_key(prefix: &str, ts: DateTime<Utc>) -> String {
    let prefix = prefix.trim_matches('/');
    let stamp = ts.format("%Y-%m-%dT%H:%M:%S");
    if prefix.is_empty() {
        format!("rethinkdb-dump-{stamp}.tar.gz")
    } else {
        format!("{prefix}/rethinkdb-dump-{stamp}.tar.gz")
    }
}

/// Run one backup cycle: produce the archive, upload it, then prune old
/// remote objects. Pruning only happens after a successful upload, and a
/// prune failure does not fail the cycle — the backup is already safe.
pub fn run_cycle(
    config: &RdumpConfig,
    producer: &dyn DumpRunner,
    store: &dyn ObjectStore,
    now: DateTime<Utc>,
) -> Result<CycleOutcome> {
    run_cycle_with(config, producer, store, now, true)
}

/// [`run_cycle`] with the retention pass made optional.
pub fn run_cycle_with(
    config: &RdumpConfig,
    producer: &dyn DumpRunner,
    store: &dyn ObjectStore,
    now: DateTime<Utc>,
    prune_after: bool,
) -> Result<CycleOutcome> {
    let archive = Path::new(&config.archive.path);
    info!(path = %archive.display(), "producing database dump");
    producer.produce(archive)?;

    let key = backup_key(&config.storage.prefix, now);
    info!(key = %key, "uploading archive");
    store.put_file(archive, &key)?;

    // The archive stays on disk; the next cycle overwrites it in place.
    let (deleted, failed) = if prune_after {
        let policy = RetentionPolicy::from_config(&config.retention)?;
        prune(store, &config.storage.prefix, &policy, now)?
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(CycleOutcome {
        uploaded_key: key,
        deleted_keys: deleted,
        failed_deletes: failed,
    })
}

/// List everything under `prefix` and delete what the policy rejects.
/// Returns (deleted, failed). Individual delete failures are logged and
/// collected rather than aborting the pass.
pub fn prune(
    store: &dyn ObjectStore,
    prefix: &str,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Result<(Vec<String>, Vec<String>)> {
    let listing = store.list(prefix)?;
    let doomed = policy.select_for_deletion(&listing, now);
    if doomed.is_empty() {
        info!(objects = listing.len(), "retention: nothing to delete");
        return Ok((Vec::new(), Vec::new()));
    }

    info!(
        objects = listing.len(),
        to_delete = doomed.len(),
        "retention: deleting old backups"
    );

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    for key in doomed {
        match store.delete(&key) {
            Ok(()) => {
                info!(key = %key, "deleted old backup");
                deleted.push(key);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "failed to delete old backup");
                failed.push(key);
            }
        }
    }
    Ok((deleted, failed))
}

/// Dry-run variant of [`prune`]: report what would be deleted.
pub fn prune_preview(
    store: &dyn ObjectStore,
    prefix: &str,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let listing = store.list(prefix)?;
    Ok(policy.select_for_deletion(&listing, now))
}
