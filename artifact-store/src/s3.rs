use crate::ObjectStore;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use newsdesk_core::{CoreError, StorageCredentials, StorageError};
use std::path::Path;
use tracing::{debug, error};

/// Whole-file transfers against an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Builds a client from explicit credentials instead of the ambient AWS
    /// profile chain.
    pub async fn connect(credentials: &StorageCredentials) -> Self {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "newsdesk-env",
        );
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .load()
            .await;

        debug!("S3 client ready for region {}", credentials.region);
        Self::from_client(Client::new(&config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3ObjectStore {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), CoreError> {
        let upload_failed = |reason: String| StorageError::UploadFailed {
            local_path: local_path.display().to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("PutObject s3://{}/{} failed", bucket, key);
                upload_failed(DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), CoreError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|service| service.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    return Err(StorageError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                    .into());
                }
                return Err(StorageError::DownloadFailed {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    reason: DisplayErrorContext(&e).to_string(),
                }
                .into());
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            })?
            .into_bytes();

        crate::write_local(local_path, &bytes).await
    }
}
