use chrono::Utc;

use rdump_core::app;
use rdump_core::config::RdumpConfig;
use rdump_core::producer::RethinkDump;

pub(crate) fn run_once(
    config: &RdumpConfig,
    no_prune: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::build_store(config)?;
    let producer = RethinkDump::from_config(&config.database);

    let outcome = app::run_cycle_with(config, &producer, &store, Utc::now(), !no_prune)?;

    println!("Uploaded: {}", outcome.uploaded_key);
    if !outcome.deleted_keys.is_empty() {
        println!("Pruned {} old backup(s):", outcome.deleted_keys.len());
        for key in &outcome.deleted_keys {
            println!("  {key}");
        }
    }
    if !outcome.failed_deletes.is_empty() {
        eprintln!(
            "Warning: {} old backup(s) could not be deleted:",
            outcome.failed_deletes.len()
        );
        for key in &outcome.failed_deletes {
            eprintln!("  {key}");
        }
    }
    Ok(())
}
