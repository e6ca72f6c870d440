use chrono::{DateTime, Utc};

use crate::config::{RetentionConfig, RetentionKind};
use crate::error::{RdumpError, Result};
use crate::storage::RemoteObject;

/// Decides which remote backups to throw away, given a full listing.
/// Pure: no clock reads, no network.
#[derive(Debug, Clone)]
pub enum RetentionPolicy {
    /// Delete objects strictly older than `max_age`.
    Age { max_age: chrono::Duration },
    /// Keep the `keep_last` most recently modified objects, delete the rest.
    Count { keep_last: usize },
}

impl RetentionPolicy {
    pub fn from_config(cfg: &RetentionConfig) -> Result<Self> {
        match cfg.policy {
            RetentionKind::Age => Ok(Self::Age {
                max_age: parse_duration(&cfg.max_age)?,
            }),
            RetentionKind::Count => {
                if cfg.keep_last == 0 {
                    return Err(RdumpError::Config(
                        "retention.keep_last must be at least 1".into(),
                    ));
                }
                Ok(Self::Count {
                    keep_last: cfg.keep_last,
                })
            }
        }
    }

    /// Keys to delete from `objects`. An object exactly at the age
    /// threshold is kept.
    pub fn select_for_deletion(
        &self,
        objects: &[RemoteObject],
        now: DateTime<Utc>,
    ) -> Vec<String> {
        match *self {
            RetentionPolicy::Age { max_age } => objects
                .iter()
                .filter(|o| now - o.last_modified > max_age)
                .map(|o| o.key.clone())
                .collect(),
            RetentionPolicy::Count { keep_last } => {
                let mut sorted: Vec<&RemoteObject> = objects.iter().collect();
                // Newest first; equal timestamps fall back to the key so
                // the decision is deterministic.
                sorted.sort_by(|a, b| {
                    b.last_modified
                        .cmp(&a.last_modified)
                        .then_with(|| b.key.cmp(&a.key))
                });
                sorted
                    .into_iter()
                    .skip(keep_last)
                    .map(|o| o.key.clone())
                    .collect()
            }
        }
    }
}

/// Parse a duration string like "30m", "48h", "2d", "1w". Plain numbers
/// are days. Same dialect as `schedule.every`.
pub fn parse_duration(s: &str) -> Result<chrono::Duration> {
    let std_duration = crate::config::parse_human_duration(s)?;
    chrono::Duration::from_std(std_duration)
        .map_err(|_| RdumpError::Config(format!("duration out of range: '{s}'")))
}
