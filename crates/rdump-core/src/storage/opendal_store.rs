use std::path::Path;

use chrono::{DateTime, Utc};
use opendal::{BlockingOperator, Operator};

use crate::credentials::GcsCredentials;
use crate::error::{RdumpError, Result};
use crate::storage::{ObjectStore, RemoteObject};

pub struct OpendalStore {
    op: BlockingOperator,
}

impl OpendalStore {
    /// Store backed by a local filesystem directory, for development and
    /// integration tests.
    pub fn local(root: &str) -> Result<Self> {
        let builder = opendal::services::Fs::default().root(root);
        let op = Operator::new(builder)
            .map_err(|e| RdumpError::Other(format!("opendal fs init: {e}")))?
            .finish()
            .blocking();
        Ok(Self { op })
    }

    /// Store backed by a Google Cloud Storage bucket.
    pub fn gcs(bucket: &str, credentials: &GcsCredentials) -> Result<Self> {
        let mut builder = opendal::services::Gcs::default().bucket(bucket);
        builder = match credentials {
            GcsCredentials::KeyFile(path) => builder.credential_path(path),
            GcsCredentials::InlineJson(json) => {
                builder.credential(&crate::credentials::encode_inline(json))
            }
        };
        let op = Operator::new(builder)
            .map_err(|e| RdumpError::Other(format!("opendal gcs init: {e}")))?
            .finish()
            .blocking();
        Ok(Self { op })
    }
}

impl ObjectStore for OpendalStore {
    fn put_file(&self, local: &Path, key: &str) -> Result<()> {
        let data = std::fs::read(local)?;
        self.op.write(key, data).map_err(RdumpError::from)?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<RemoteObject>> {
        let dir = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };

        let mut objects = Vec::new();
        let entries = match self.op.list(&dir) {
            Ok(entries) => entries,
            // An empty prefix that has never been written to.
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => return Ok(objects),
            Err(e) => return Err(RdumpError::from(e)),
        };

        for entry in entries {
            let path = entry.path().to_string();
            // Skip directory markers
            if path.ends_with('/') {
                continue;
            }
            let meta = entry.metadata();
            let (last_modified, size) = match meta.last_modified() {
                Some(t) => (t, Some(meta.content_length())),
                None => {
                    // Some services omit timestamps in listings; stat fills them in.
                    let stat = self.op.stat(&path).map_err(RdumpError::from)?;
                    (
                        stat.last_modified().unwrap_or(DateTime::<Utc>::MIN_UTC),
                        Some(stat.content_length()),
                    )
                }
            };
            objects.push(RemoteObject {
                key: path,
                last_modified,
                size,
            });
        }

        Ok(objects)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.op.delete(key).map_err(RdumpError::from)
    }
}
