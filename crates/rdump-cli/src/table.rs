use std::io::IsTerminal;

use comfy_table::{presets::NOTHING, Attribute, Cell, Table};

/// Plain-preset tables, bold headers only when stdout is a color tty.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TableTheme {
    use_color: bool,
}

impl TableTheme {
    pub(crate) fn detect() -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var_os("NO_COLOR").is_some();
        Self {
            use_color: is_tty && !no_color,
        }
    }

    pub(crate) fn data_table(self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_header(headers.iter().map(|h| self.header_cell(h)).collect::<Vec<_>>());
        table
    }

    fn header_cell(self, text: &str) -> Cell {
        let cell = Cell::new(text);
        if self.use_color {
            cell.add_attribute(Attribute::Bold)
        } else {
            cell
        }
    }
}

/// Render a byte count for the listing output.
pub(crate) fn format_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
