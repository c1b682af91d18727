use crate::ObjectStore;
use newsdesk_core::{CoreError, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Buckets as sub-directories of a root, for runs without S3.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

impl ObjectStore for FsObjectStore {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), CoreError> {
        let target = self.object_path(bucket, key);
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| StorageError::UploadFailed {
                local_path: local_path.display().to_string(),
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        crate::write_local(&target, &bytes).await
    }

    async fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), CoreError> {
        let source = self.object_path(bucket, key);
        let bytes = match tokio::fs::read(&source).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }
                .into())
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        };
        crate::write_local(local_path, &bytes).await
    }
}
