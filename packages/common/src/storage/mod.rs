mod error;
mod path;
mod public_url;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3_store;

use std::path::PathBuf;
use std::sync::Arc;

pub use error::StorageError;
pub use path::{ObjectPath, next_upload_stamp, sanitize_file_name};
pub use public_url::PublicUrlScheme;
pub use traits::ObjectStore;

use crate::config::{StorageBackend, StorageConfig};

/// Build the configured object store.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let urls = PublicUrlScheme::new(&config.public_base_url, &config.bucket);
            let store = filesystem::FilesystemObjectStore::new(
                PathBuf::from(&config.root),
                config.max_object_size,
                urls,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => Ok(Arc::new(s3_store::S3ObjectStore::from_config(config)?)),
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "S3 backend requires the `object-storage` feature".into(),
        )),
    }
}
