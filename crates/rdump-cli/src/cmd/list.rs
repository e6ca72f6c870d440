use comfy_table::Cell;

use rdump_core::config::RdumpConfig;
use rdump_core::storage::ObjectStore;

use crate::table::{format_bytes, TableTheme};

pub(crate) fn run_list(
    config: &RdumpConfig,
    last: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::build_store(config)?;

    let mut objects = store.list(&config.storage.prefix)?;
    // Oldest first, so the newest backup is the last line on screen.
    objects.sort_by(|a, b| {
        a.last_modified
            .cmp(&b.last_modified)
            .then_with(|| a.key.cmp(&b.key))
    });

    if let Some(n) = last {
        let len = objects.len();
        if n < len {
            objects.drain(..len - n);
        }
    }

    if objects.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    let theme = TableTheme::detect();
    let mut table = theme.data_table(&["Key", "Modified", "Size"]);
    for obj in &objects {
        let size = obj.size.map(format_bytes).unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(obj.key.clone()),
            Cell::new(obj.last_modified.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            Cell::new(size),
        ]);
    }
    println!("{table}");

    Ok(())
}
