use std::fmt;
use std::path::{Path, PathBuf};

use super::types::RdumpConfig;
use crate::error::{RdumpError, Result};

/// Expand `${VAR}` and `${VAR:-default}` placeholders in raw config text.
fn expand_env_placeholders(input: &str, path: &Path) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0usize;

    while let Some(offset) = input[cursor..].find("${") {
        let start = cursor + offset;
        out.push_str(&input[cursor..start]);

        let token_start = start + 2;
        let Some(token_end_rel) = input[token_start..].find('}') else {
            return Err(expand_error(path, "unterminated environment placeholder"));
        };
        let token_end = token_start + token_end_rel;
        let token = &input[token_start..token_end];
        out.push_str(&resolve_env_token(token, path)?);
        cursor = token_end + 1;
    }

    out.push_str(&input[cursor..]);
    Ok(out)
}

fn resolve_env_token(token: &str, path: &Path) -> Result<String> {
    if token.is_empty() {
        return Err(expand_error(path, "empty environment placeholder"));
    }

    if let Some(split_at) = token.find(":-") {
        let name = &token[..split_at];
        let default = &token[split_at + 2..];
        if !is_valid_env_var_name(name) {
            return Err(expand_error(
                path,
                format!("invalid environment variable name '{name}'"),
            ));
        }
        return match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Ok(default.to_string()),
        };
    }

    if !is_valid_env_var_name(token) {
        return Err(expand_error(
            path,
            format!("invalid environment placeholder '{token}'"),
        ));
    }

    match std::env::var(token) {
        Ok(value) => Ok(value),
        Err(_) => Err(expand_error(
            path,
            format!("environment variable '{token}' is not set"),
        )),
    }
}

fn is_valid_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || first.is_ascii_alphabetic()) {
        return false;
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn expand_error(path: &Path, message: impl fmt::Display) -> RdumpError {
    RdumpError::Config(format!("invalid config '{}': {message}", path.display()))
}

/// Replace a leading `~/` with the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home.to_string_lossy().into_owned();
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    path.to_string()
}

/// Tracks where the config file was found.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Explicitly passed via `--config`.
    CliArg(PathBuf),
    /// Set via the `RDUMP_CONFIG` env var.
    EnvVar(PathBuf),
    /// Found by searching standard locations.
    SearchOrder { path: PathBuf, level: &'static str },
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::CliArg(p) => p,
            ConfigSource::EnvVar(p) => p,
            ConfigSource::SearchOrder { path, .. } => path,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CliArg(p) => write!(f, "{} (--config)", p.display()),
            ConfigSource::EnvVar(p) => write!(f, "{} (RDUMP_CONFIG)", p.display()),
            ConfigSource::SearchOrder { path, level } => {
                write!(f, "{} ({})", path.display(), level)
            }
        }
    }
}

/// Returns search locations in priority order: project, user, system.
pub fn default_config_search_paths() -> Vec<(PathBuf, &'static str)> {
    let mut paths = vec![(PathBuf::from("rdump.yaml"), "project")];

    #[cfg(windows)]
    let user_config = dirs::config_dir().map(|base| base.join("rdump").join("config.yaml"));

    #[cfg(not(windows))]
    let user_config = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|base| base.join("rdump").join("config.yaml"));

    if let Some(p) = user_config {
        paths.push((p, "user"));
    }

    #[cfg(windows)]
    {
        let program_data = std::env::var_os("PROGRAMDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"));
        paths.push((program_data.join("rdump").join("config.yaml"), "system"));
    }

    #[cfg(not(windows))]
    {
        paths.push((PathBuf::from("/etc/rdump/config.yaml"), "system"));
    }

    paths
}

/// Resolve which config file to use.
///
/// Priority: CLI arg > `RDUMP_CONFIG` env var > first existing file from
/// the search paths. Returns `None` if nothing is found.
pub fn resolve_config_path(cli_config: Option<&str>) -> Option<ConfigSource> {
    if let Some(path) = cli_config {
        return Some(ConfigSource::CliArg(PathBuf::from(path)));
    }

    if let Ok(val) = std::env::var("RDUMP_CONFIG") {
        if !val.is_empty() {
            return Some(ConfigSource::EnvVar(PathBuf::from(val)));
        }
    }

    for (path, level) in default_config_search_paths() {
        if path.exists() {
            return Some(ConfigSource::SearchOrder { path, level });
        }
    }

    None
}

/// Load, parse, and validate a config file.
pub fn load_config(path: &Path) -> Result<RdumpConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| RdumpError::Config(format!("cannot read '{}': {e}", path.display())))?;
    let expanded = expand_env_placeholders(&contents, path)?;
    let mut config: RdumpConfig = serde_yaml::from_str(&expanded)
        .map_err(|e| RdumpError::Config(format!("invalid config '{}': {e}", path.display())))?;

    config.archive.path = expand_tilde(&config.archive.path);
    if let Some(ref ca) = config.database.tls_ca {
        config.database.tls_ca = Some(expand_tilde(ca));
    }
    if let Some(ref file) = config.storage.credentials_file {
        config.storage.credentials_file = Some(expand_tilde(file));
    }
    if let Some(ref root) = config.storage.root {
        config.storage.root = Some(expand_tilde(root));
    }

    config.validate()?;
    Ok(config)
}

/// Returns a minimal YAML config template suitable for bootstrapping.
pub fn minimal_config_template() -> &'static str {
    r#"# rdump configuration file
# Minimal required configuration.

database:
  host: localhost

archive:
  path: /tmp/rethinkdb-dump.tar.gz

storage:
  backend: gcs
  bucket: my-backups
  project_id: my-project

retention:
  policy: count
  keep_last: 100

schedule:
  every: 24h
  on_startup: true

# --- Common optional settings (uncomment as needed) ---

# database:
#   tls_ca: /etc/rdump/ca.pem
#   password: ${RDUMP_PASSWORD:-}
#
# storage:
#   credentials_file: /etc/rdump/service-account.json
#
# retention:
#   policy: age
#   max_age: 30d
"#
}
