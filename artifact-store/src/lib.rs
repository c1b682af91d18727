pub mod local;
pub mod s3;
pub mod serializer;

#[cfg(test)]
mod tests;

pub use local::FsObjectStore;
pub use s3::S3ObjectStore;
pub use serializer::{preview, read_posts, write_posts};

use chrono::NaiveDate;
use newsdesk_core::{ArtifactFormat, CoreError, DatedArtifact};
use std::path::Path;
use tracing::{error, info};

/// Whole-file transfer to and from a bucket. Later writers of a key replace
/// earlier ones.
pub trait ObjectStore {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), CoreError>;

    async fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), CoreError>;
}

/// Backend picked at startup.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    S3(S3ObjectStore),
    Local(FsObjectStore),
}

impl ObjectStore for StoreBackend {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), CoreError> {
        match self {
            StoreBackend::S3(store) => store.upload(local_path, bucket, key).await,
            StoreBackend::Local(store) => store.upload(local_path, bucket, key).await,
        }
    }

    async fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), CoreError> {
        match self {
            StoreBackend::S3(store) => store.download(bucket, key, local_path).await,
            StoreBackend::Local(store) => store.download(bucket, key, local_path).await,
        }
    }
}

/// `{prefix}/{name_prefix}_{YYYY-MM-DD}.csv`
pub fn dated_key(prefix: &str, name_prefix: &str, date: NaiveDate) -> String {
    DatedArtifact::new(prefix, name_prefix, date, ArtifactFormat::Csv).object_key()
}

/// Uploads a local file and logs the outcome.
pub async fn upload_artifact<S: ObjectStore>(
    store: &S,
    local_path: &Path,
    bucket: &str,
    key: &str,
) -> Result<(), CoreError> {
    info!("📤 Uploading {} to s3://{}/{}", local_path.display(), bucket, key);
    match store.upload(local_path, bucket, key).await {
        Ok(()) => {
            info!("✅ Uploaded s3://{}/{}", bucket, key);
            Ok(())
        }
        Err(e) => {
            error!("❌ Upload failed: {}", e);
            Err(e)
        }
    }
}

/// Downloads one dated artifact into `local_path` and returns its key.
pub async fn download_artifact<S: ObjectStore>(
    store: &S,
    bucket: &str,
    artifact: &DatedArtifact,
    local_path: &Path,
) -> Result<String, CoreError> {
    let key = artifact.object_key();
    info!("📥 Downloading s3://{}/{} to {}", bucket, key, local_path.display());

    match store.download(bucket, &key, local_path).await {
        Ok(()) => {
            info!("✅ Downloaded: {}", key);
            Ok(key)
        }
        Err(e) => {
            error!("❌ Failed to download s3://{}/{}: {}", bucket, key, e);
            Err(e)
        }
    }
}

/// Downloads the CSV artifact dated `today` and returns the key it read.
pub async fn download_latest<S: ObjectStore>(
    store: &S,
    bucket: &str,
    prefix: &str,
    name_prefix: &str,
    local_path: &Path,
    today: NaiveDate,
) -> Result<String, CoreError> {
    let artifact = DatedArtifact::new(prefix, name_prefix, today, ArtifactFormat::Csv);
    download_artifact(store, bucket, &artifact, local_path).await
}

pub(crate) async fn write_local(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
