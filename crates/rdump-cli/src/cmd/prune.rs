use chrono::Utc;

use rdump_core::app;
use rdump_core::config::RdumpConfig;
use rdump_core::retention::RetentionPolicy;

pub(crate) fn run_prune(
    config: &RdumpConfig,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::build_store(config)?;
    let policy = RetentionPolicy::from_config(&config.retention)?;
    let now = Utc::now();

    if dry_run {
        let doomed = app::prune_preview(&store, &config.storage.prefix, &policy, now)?;
        if doomed.is_empty() {
            println!("Dry run: nothing to delete.");
        } else {
            for key in &doomed {
                println!("delete {key}");
            }
            println!("Dry run: would delete {} backup(s)", doomed.len());
        }
        return Ok(());
    }

    let (deleted, failed) = app::prune(&store, &config.storage.prefix, &policy, now)?;
    for key in &deleted {
        println!("deleted {key}");
    }
    println!("Deleted {} backup(s)", deleted.len());

    if !failed.is_empty() {
        for key in &failed {
            eprintln!("failed to delete {key}");
        }
        return Err(format!("{} delete(s) failed", failed.len()).into());
    }
    Ok(())
}
