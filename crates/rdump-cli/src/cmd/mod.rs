pub(crate) mod daemon;
pub(crate) mod list;
pub(crate) mod prune;
pub(crate) mod run;

use rdump_core::config::{RdumpConfig, StorageBackendKind};
use rdump_core::credentials;
use rdump_core::storage::OpendalStore;

/// Build the object store the configured backend points at.
pub(crate) fn build_store(config: &RdumpConfig) -> Result<OpendalStore, Box<dyn std::error::Error>> {
    match config.storage.backend {
        StorageBackendKind::Gcs => {
            let bucket = config
                .storage
                .bucket
                .as_deref()
                .ok_or("storage.bucket is required for the gcs backend")?;
            let creds = credentials::resolve_credentials(&config.storage)?;
            if let Some(project) = &config.storage.project_id {
                tracing::info!(project = %project, bucket, "using Cloud Storage bucket");
            } else {
                tracing::info!(bucket, "using Cloud Storage bucket");
            }
            Ok(OpendalStore::gcs(bucket, &creds)?)
        }
        StorageBackendKind::Local => {
            let root = config
                .storage
                .root
                .as_deref()
                .ok_or("storage.root is required for the local backend")?;
            tracing::info!(root, "using local filesystem store");
            Ok(OpendalStore::local(root)?)
        }
    }
}
