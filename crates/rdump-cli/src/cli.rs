use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rdump",
    version,
    about = "Periodic RethinkDB dumps shipped to cloud object storage",
    after_help = "\
Configuration file lookup order:
  1. --config <path>             (explicit flag)
  2. $RDUMP_CONFIG               (environment variable)
  3. ./rdump.yaml                (project)
  4. Platform user config dir + /rdump/config.yaml (e.g. ~/.config or %APPDATA%)
  5. Platform system config path (Unix: /etc/rdump/config.yaml, Windows: %PROGRAMDATA%/rdump/config.yaml)

Environment variables:
  RDUMP_CONFIG      Path to configuration file (overrides default search)
  RDUMP_PASSWORD    Database driver password (overrides database.password)
  BACKUP_CLIENT_ID / BACKUP_CLIENT_EMAIL / BACKUP_PRIVATE_KEY_ID / BACKUP_PRIVATE_KEY
                    Service-account fields, used when storage.credentials_file is unset"
)]
pub(crate) struct Cli {
    /// Path to configuration file (overrides RDUMP_CONFIG and default search)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a single backup cycle (dump, upload, prune) and exit
    Run {
        /// Skip the retention pass after uploading
        #[arg(long)]
        no_prune: bool,
    },

    /// Run backup cycles on a schedule until stopped
    Daemon,

    /// Apply the retention policy to remote backups without taking a new one
    Prune {
        /// Show what would be deleted without deleting anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List remote backups
    List {
        /// Show only the N most recent backups
        #[arg(long)]
        last: Option<usize>,
    },

    /// Generate a starter configuration file
    Config {
        /// Destination path (defaults to an interactive choice)
        dest: Option<String>,
    },
}
