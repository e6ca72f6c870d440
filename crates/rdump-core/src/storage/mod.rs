pub mod opendal_store;

pub use opendal_store::OpendalStore;

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;

/// A single backup object in remote storage.
#[derive(Debug, Clone)]
pub struct RemoteObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: Option<u64>,
}

/// Blob-store seam: upload, list, delete. Ordering of listings is the
/// retention policy's business, not the store's.
pub trait ObjectStore {
    /// Upload a local file under `key`, overwriting any existing object.
    fn put_file(&self, local: &Path, key: &str) -> Result<()>;

    /// All objects whose key starts with `prefix`.
    fn list(&self, prefix: &str) -> Result<Vec<RemoteObject>>;

    /// Remove one object.
    fn delete(&self, key: &str) -> Result<()>;
}
