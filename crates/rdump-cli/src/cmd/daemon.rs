use std::time::{Duration, Instant};

use chrono::Utc;

use rdump_core::app;
use rdump_core::app::scheduler::Schedule;
use rdump_core::config::RdumpConfig;
use rdump_core::producer::RethinkDump;

use crate::signal::shutdown_requested;

pub(crate) fn run_daemon(config: &RdumpConfig) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = Schedule::from_config(&config.schedule)?;

    // Fail on bad storage settings or missing credentials before the
    // first sleep, not hours into the night.
    let store = super::build_store(config)?;
    let producer = RethinkDump::from_config(&config.database);

    tracing::info!(
        interval = ?schedule.interval(),
        on_startup = schedule.on_startup(),
        host = %config.database.host,
        "daemon starting"
    );

    let mut next_run = schedule.first_run(Instant::now());
    if !schedule.on_startup() {
        log_next_run(next_run - Instant::now());
    }

    loop {
        if shutdown_requested() {
            tracing::info!("shutdown signal received, exiting");
            return Ok(());
        }

        if Instant::now() >= next_run {
            run_backup_cycle(config, &producer, &store);

            if shutdown_requested() {
                tracing::info!("shutdown signal received, exiting");
                return Ok(());
            }

            next_run = schedule.next_run(Instant::now());
            log_next_run(next_run - Instant::now());
        }

        std::thread::sleep(Duration::from_secs(1));
    }
}

fn run_backup_cycle(
    config: &RdumpConfig,
    producer: &RethinkDump,
    store: &rdump_core::storage::OpendalStore,
) {
    tracing::info!("backup cycle starting");
    let cycle_start = Instant::now();

    match app::run_cycle(config, producer, store, Utc::now()) {
        Ok(outcome) => {
            let elapsed = cycle_start.elapsed();
            if outcome.failed_deletes.is_empty() {
                tracing::info!(
                    duration = ?elapsed,
                    key = %outcome.uploaded_key,
                    pruned = outcome.deleted_keys.len(),
                    "backup cycle finished successfully"
                );
            } else {
                tracing::warn!(
                    duration = ?elapsed,
                    key = %outcome.uploaded_key,
                    pruned = outcome.deleted_keys.len(),
                    failed_deletes = outcome.failed_deletes.len(),
                    "backup cycle finished with prune errors"
                );
            }
        }
        Err(e) => {
            // The daemon keeps running; the next cycle may succeed.
            tracing::error!(
                duration = ?cycle_start.elapsed(),
                error = %e,
                "backup cycle failed"
            );
        }
    }
}

fn log_next_run(delay: Duration) {
    let next_wall = chrono::Local::now() + delay;
    tracing::info!(
        next_run = %next_wall.format("%Y-%m-%d %H:%M:%S %Z"),
        delay = ?delay,
        "next backup scheduled"
    );
}
