use std::time::Duration;

pub(super) fn default_host() -> String {
    "localhost".to_string()
}

pub(super) fn default_dump_command() -> String {
    "rethinkdb".to_string()
}

pub(super) fn default_archive_path() -> String {
    std::env::temp_dir()
        .join("rethinkdb-dump.tar.gz")
        .to_string_lossy()
        .into_owned()
}

pub(super) fn default_prefix() -> String {
    "rethinkdb".to_string()
}

pub(super) fn default_keep_last() -> usize {
    100
}

pub(super) fn default_max_age() -> String {
    "30d".to_string()
}

pub(super) fn default_schedule_every() -> String {
    "24h".to_string()
}

pub(super) fn default_on_startup() -> bool {
    true
}

/// Parse a simple duration string like "45s", "30m", "4h", "2d", or "1w".
/// Plain numbers are treated as days. Shared by `schedule.every` and
/// `retention.max_age` so both accept the same suffixes.
pub fn parse_human_duration(raw: &str) -> crate::error::Result<Duration> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(crate::error::RdumpError::Config(
            "duration must not be empty".into(),
        ));
    }

    let (num_part, unit) = match input.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&input[..input.len() - 1], Some(c)),
        Some(_) => (input, None),
        None => {
            return Err(crate::error::RdumpError::Config(
                "duration must not be empty".into(),
            ));
        }
    };

    let value: u64 = num_part.parse().map_err(|_| {
        crate::error::RdumpError::Config(format!("invalid duration value: '{raw}'"))
    })?;

    let secs = match unit {
        Some('s') | Some('S') => value,
        Some('m') | Some('M') => value.saturating_mul(60),
        Some('h') | Some('H') => value.saturating_mul(60 * 60),
        Some('d') | Some('D') => value.saturating_mul(60 * 60 * 24),
        Some('w') | Some('W') => value.saturating_mul(60 * 60 * 24 * 7),
        Some(other) => {
            return Err(crate::error::RdumpError::Config(format!(
                "unsupported duration suffix '{other}' in '{raw}' (use s/m/h/d/w)"
            )));
        }
        None => value.saturating_mul(60 * 60 * 24),
    };

    if secs == 0 {
        return Err(crate::error::RdumpError::Config(
            "duration must be greater than zero".into(),
        ));
    }

    Ok(Duration::from_secs(secs))
}
