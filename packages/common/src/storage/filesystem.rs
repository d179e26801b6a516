use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::error::StorageError;
use super::path::ObjectPath;
use super::public_url::PublicUrlScheme;
use super::traits::ObjectStore;

/// Filesystem-backed bucket.
///
/// Objects live at `{base_path}/{object path}`; writes go through
/// `{base_path}/.tmp` and are renamed into place so readers never see a
/// partially written object.
pub struct FilesystemObjectStore {
    base_path: PathBuf,
    max_size: u64,
    urls: PublicUrlScheme,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store.
    pub async fn new(
        base_path: PathBuf,
        max_size: u64,
        urls: PublicUrlScheme,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
            urls,
        })
    }

    fn object_path(&self, path: &ObjectPath) -> PathBuf {
        self.base_path.join(path.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    fn url_scheme(&self) -> &PublicUrlScheme {
        &self.urls
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        data: &[u8],
        _content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let target = self.object_path(path);
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(%path, bytes = data.len(), "Object stored");
        Ok(self.public_url(path))
    }

    async fn remove(&self, paths: &[ObjectPath]) -> Result<(), StorageError> {
        for path in paths {
            match fs::remove_file(self.object_path(path)).await {
                Ok(()) => debug!(%path, "Object removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(%path, "Object already absent");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn get(&self, path: &ObjectPath) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.object_path(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &ObjectPath) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.object_path(path)).await?)
    }
}
