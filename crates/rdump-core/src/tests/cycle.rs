use chrono::{Duration, TimeZone, Utc};

use crate::app::{backup_key, prune_preview, run_cycle};
use crate::config::{RetentionConfig, RetentionKind};
use crate::retention::RetentionPolicy;
use crate::testutil::{test_config, MemoryStore, StubDump};

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn backup_key_embeds_utc_timestamp() {
    assert_eq!(
        backup_key("rethinkdb", fixed_now()),
        "rethinkdb/rethinkdb-dump-2024-03-01T12:00:00.tar.gz"
    );
}

#[test]
fn backup_key_without_prefix() {
    assert_eq!(
        backup_key("", fixed_now()),
        "rethinkdb-dump-2024-03-01T12:00:00.tar.gz"
    );
    assert_eq!(
        backup_key("/rethinkdb/", fixed_now()),
        "rethinkdb/rethinkdb-dump-2024-03-01T12:00:00.tar.gz"
    );
}

#[test]
fn successful_cycle_uploads_and_keeps_archive_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("dump.tar.gz");
    let config = test_config(&archive);
    let producer = StubDump::new();
    let store = MemoryStore::new(fixed_now());

    let outcome = run_cycle(&config, &producer, &store, fixed_now()).unwrap();

    assert_eq!(
        outcome.uploaded_key,
        "rethinkdb/rethinkdb-dump-2024-03-01T12:00:00.tar.gz"
    );
    assert!(outcome.deleted_keys.is_empty());
    assert!(outcome.failed_deletes.is_empty());
    assert!(store.contains(&outcome.uploaded_key));
    // The archive stays for the next cycle to overwrite.
    assert!(archive.exists());
    assert_eq!(producer.produced_paths(), vec![archive]);
}

#[test]
fn dump_failure_aborts_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("dump.tar.gz");
    let config = test_config(&archive);
    let producer = StubDump::failing();
    let store = MemoryStore::new(fixed_now());
    store.seed("rethinkdb/old", fixed_now() - Duration::days(400));

    assert!(run_cycle(&config, &producer, &store, fixed_now()).is_err());
    // Nothing uploaded, nothing pruned.
    assert_eq!(store.len(), 1);
    assert!(store.deleted_keys().is_empty());
}

#[test]
fn upload_failure_skips_retention() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("dump.tar.gz");
    let config = test_config(&archive);
    let producer = StubDump::new();
    let mut store = MemoryStore::new(fixed_now());
    store.fail_uploads = true;
    store.seed("rethinkdb/old", fixed_now() - Duration::days(400));

    assert!(run_cycle(&config, &producer, &store, fixed_now()).is_err());
    assert!(store.deleted_keys().is_empty());
    assert!(store.contains("rethinkdb/old"));
}

#[test]
fn delete_failures_do_not_fail_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("dump.tar.gz");
    let mut config = test_config(&archive);
    config.retention = RetentionConfig {
        policy: RetentionKind::Count,
        keep_last: 1,
        max_age: "30d".to_string(),
    };
    let producer = StubDump::new();
    let mut store = MemoryStore::new(fixed_now());
    store.fail_deletes = true;
    store.seed("rethinkdb/stale", fixed_now() - Duration::days(2));

    let outcome = run_cycle(&config, &producer, &store, fixed_now()).unwrap();

    // The backup is safe; the failed delete is reported, not fatal.
    assert!(store.contains(&outcome.uploaded_key));
    assert!(outcome.deleted_keys.is_empty());
    assert_eq!(outcome.failed_deletes, vec!["rethinkdb/stale".to_string()]);
}

#[test]
fn count_retention_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("dump.tar.gz");
    let config = test_config(&archive); // default policy: keep_last = 100
    let producer = StubDump::new();
    let now = fixed_now();
    let store = MemoryStore::new(now);

    // 105 daily backups, the newest one day old.
    for i in 0..105 {
        let ts = now - Duration::days(i + 1);
        store.seed(&backup_key("rethinkdb", ts), ts);
    }

    let outcome = run_cycle(&config, &producer, &store, now).unwrap();

    // Fresh upload plus 99 seeds survive; the 6 oldest go.
    assert_eq!(outcome.deleted_keys.len(), 6);
    assert_eq!(store.len(), 100);
    assert!(store.contains(&outcome.uploaded_key));
    for i in 99..105 {
        let ts = now - Duration::days(i + 1);
        assert!(outcome.deleted_keys.contains(&backup_key("rethinkdb", ts)));
    }
}

#[test]
fn age_retention_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("dump.tar.gz");
    let mut config = test_config(&archive);
    config.retention = RetentionConfig {
        policy: RetentionKind::Age,
        keep_last: 100,
        max_age: "30d".to_string(),
    };
    let producer = StubDump::new();
    let now = fixed_now();
    let store = MemoryStore::new(now);
    store.seed("rethinkdb/ancient", now - Duration::days(31));
    store.seed("rethinkdb/recent", now - Duration::days(5));

    let outcome = run_cycle(&config, &producer, &store, now).unwrap();

    assert_eq!(outcome.deleted_keys, vec!["rethinkdb/ancient".to_string()]);
    assert!(store.contains("rethinkdb/recent"));
    assert!(store.contains(&outcome.uploaded_key));
}

#[test]
fn prune_preview_reports_without_deleting() {
    let now = fixed_now();
    let store = MemoryStore::new(now);
    store.seed("rethinkdb/ancient", now - Duration::days(31));
    store.seed("rethinkdb/recent", now - Duration::days(5));
    let policy = RetentionPolicy::Age {
        max_age: Duration::days(30),
    };

    let doomed = prune_preview(&store, "rethinkdb", &policy, now).unwrap();

    assert_eq!(doomed, vec!["rethinkdb/ancient".to_string()]);
    assert_eq!(store.len(), 2);
    assert!(store.deleted_keys().is_empty());
}
