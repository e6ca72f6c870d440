use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::DatabaseConfig;
use crate::error::{RdumpError, Result};

/// Hard ceiling on a single dump invocation.
const DUMP_TIMEOUT: Duration = Duration::from_secs(4 * 3600);

/// Well-known transient path for the dump password file.
pub fn default_secret_path() -> PathBuf {
    std::env::temp_dir().join("rdump-password")
}

/// Produces the local archive. Trait seam so cycle orchestration can be
/// exercised without a real database.
pub trait DumpRunner {
    /// Produce a fresh archive at `dest`, overwriting any existing file.
    fn produce(&self, dest: &Path) -> Result<()>;
}

/// Invokes the external `rethinkdb dump` command.
pub struct RethinkDump {
    host: String,
    tls_ca: Option<String>,
    password: Option<Zeroizing<String>>,
    command: String,
    secret_path: PathBuf,
}

impl RethinkDump {
    pub fn from_config(db: &DatabaseConfig) -> Self {
        Self {
            host: db.host.clone(),
            tls_ca: db.tls_ca.clone(),
            password: resolve_password(db),
            command: db.dump_command.clone(),
            secret_path: default_secret_path(),
        }
    }

    fn build_command(&self, dest: &Path, secret: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg("dump")
            .arg("-q")
            .arg("-c")
            .arg(&self.host)
            .arg("-f")
            .arg(dest)
            .arg("--overwrite-file");
        if let Some(ref ca) = self.tls_ca {
            cmd.arg("--tls-cert").arg(ca);
        }
        if let Some(path) = secret {
            cmd.arg("--password-file").arg(path);
        }
        cmd
    }
}

impl DumpRunner for RethinkDump {
    fn produce(&self, dest: &Path) -> Result<()> {
        // The guard's Drop removes the file on every exit path, including
        // error propagation below.
        let secret = match self.password {
            Some(ref p) => Some(SecretFile::write(&self.secret_path, p)?),
            None => None,
        };

        let mut cmd = self.build_command(dest, secret.as_ref().map(|s| s.path.as_path()));

        info!(host = %self.host, dest = %dest.display(), "running database dump");
        let output = run_with_timeout(&mut cmd, DUMP_TIMEOUT).map_err(|e| {
            RdumpError::Dump(format!("failed to run '{} dump': {e}", self.command))
        })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RdumpError::Dump(format!(
                "'{} dump' exited with code {code}: {}",
                self.command,
                stderr.trim()
            )));
        }

        debug!(dest = %dest.display(), "dump finished");
        Ok(())
    }
}

/// Password resolution order: config value, then `RDUMP_PASSWORD`.
/// Empty strings (for example from `${RDUMP_PASSWORD:-}`) count as unset.
fn resolve_password(db: &DatabaseConfig) -> Option<Zeroizing<String>> {
    if let Some(ref p) = db.password {
        if !p.is_empty() {
            return Some(Zeroizing::new(p.clone()));
        }
    }
    if let Ok(pass) = std::env::var("RDUMP_PASSWORD") {
        if !pass.is_empty() {
            return Some(Zeroizing::new(pass));
        }
    }
    None
}

/// Password file written immediately before the dump invocation and
/// removed unconditionally when dropped. Content is sensitive; the file
/// is created with owner-only permissions on Unix.
struct SecretFile {
    path: PathBuf,
}

impl SecretFile {
    fn write(path: &Path, secret: &str) -> Result<Self> {
        // The path is fixed and predictable. A leftover file there would
        // keep its old permissions, so unlink it and create fresh with
        // the mode below.
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }
        let mut opts = std::fs::OpenOptions::new();
        opts.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        let mut file = opts.open(path)?;
        file.write_all(secret.as_bytes())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for SecretFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove transient password file"
                );
            }
        }
    }
}

/// Run a command with piped stdout/stderr and a timeout. The child is
/// killed if it does not complete in time.
fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> std::io::Result<Output> {
    let mut child = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;

    let deadline = Instant::now() + timeout;
    let poll_interval = Duration::from_millis(100);

    loop {
        match child.try_wait()? {
            Some(status) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(|mut r| {
                        let mut buf = Vec::new();
                        std::io::Read::read_to_end(&mut r, &mut buf).ok();
                        buf
                    })
                    .unwrap_or_default();
                let stderr = child
                    .stderr
                    .take()
                    .map(|mut r| {
                        let mut buf = Vec::new();
                        std::io::Read::read_to_end(&mut r, &mut buf).ok();
                        buf
                    })
                    .unwrap_or_default();
                return Ok(Output {
                    status,
                    stdout,
                    stderr,
                });
            }
            None => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("dump timed out after {} seconds", timeout.as_secs()),
                    ));
                }
                std::thread::sleep(poll_interval);
            }
        }
    }
}
