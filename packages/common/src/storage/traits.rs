use async_trait::async_trait;

use super::error::StorageError;
use super::path::ObjectPath;
use super::public_url::PublicUrlScheme;

/// Path-addressed object storage with deterministic public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// URL scheme used by [`ObjectStore::public_url`] and [`ObjectStore::path_from_url`].
    fn url_scheme(&self) -> &PublicUrlScheme;

    /// Store `data` at `path` and return its public URL.
    ///
    /// A failed upload leaves nothing readable at `path`.
    async fn upload(
        &self,
        path: &ObjectPath,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Remove every object in `paths`. Paths that do not exist are skipped.
    async fn remove(&self, paths: &[ObjectPath]) -> Result<(), StorageError>;

    /// Retrieve all bytes for an object.
    async fn get(&self, path: &ObjectPath) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, path: &ObjectPath) -> Result<bool, StorageError>;

    /// Public URL for `path`. Pure; no network call.
    fn public_url(&self, path: &ObjectPath) -> String {
        self.url_scheme().url_for(path)
    }

    /// Recover the object path from a public URL produced by this store.
    fn path_from_url(&self, url: &str) -> Option<ObjectPath> {
        self.url_scheme().path_of(url)
    }
}
