use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::path::ObjectPath;
use super::public_url::PublicUrlScheme;
use super::traits::ObjectStore;
use crate::config::StorageConfig;

/// S3-compatible bucket (MinIO, Supabase storage S3 endpoint, AWS).
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    max_size: u64,
    urls: PublicUrlScheme,
}

impl S3ObjectStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| StorageError::Backend("storage.endpoint is required for S3".into()))?;
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint,
        };
        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(backend_error)?
            .with_path_style();

        Ok(Self {
            bucket,
            max_size: config.max_object_size,
            urls: PublicUrlScheme::new(&config.public_base_url, &config.bucket),
        })
    }
}

fn backend_error(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn url_scheme(&self) -> &PublicUrlScheme {
        &self.urls
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object_with_content_type(
                path.as_str(),
                data,
                content_type.unwrap_or("application/octet-stream"),
            )
            .await
            .map_err(backend_error)?;

        let status = response.status_code();
        if !is_success(status) {
            return Err(StorageError::Rejected {
                status,
                message: String::from_utf8_lossy(response.as_slice()).into_owned(),
            });
        }

        debug!(%path, bytes = data.len(), "Object stored");
        Ok(self.public_url(path))
    }

    async fn remove(&self, paths: &[ObjectPath]) -> Result<(), StorageError> {
        for path in paths {
            let response = self
                .bucket
                .delete_object(path.as_str())
                .await
                .map_err(backend_error)?;
            let status = response.status_code();
            if status == 404 {
                debug!(%path, "Object already absent");
            } else if !is_success(status) {
                return Err(StorageError::Rejected {
                    status,
                    message: String::from_utf8_lossy(response.as_slice()).into_owned(),
                });
            }
        }
        Ok(())
    }

    async fn get(&self, path: &ObjectPath) -> Result<Vec<u8>, StorageError> {
        let response = self
            .bucket
            .get_object(path.as_str())
            .await
            .map_err(backend_error)?;
        match response.status_code() {
            404 => Err(StorageError::NotFound(path.to_string())),
            status if is_success(status) => Ok(response.to_vec()),
            status => Err(StorageError::Rejected {
                status,
                message: String::from_utf8_lossy(response.as_slice()).into_owned(),
            }),
        }
    }

    async fn exists(&self, path: &ObjectPath) -> Result<bool, StorageError> {
        let (_, status) = self
            .bucket
            .head_object(path.as_str())
            .await
            .map_err(backend_error)?;
        Ok(is_success(status))
    }
}
