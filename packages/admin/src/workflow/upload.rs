use std::path::Path;

use common::storage::StorageError;
use tokio::fs;

/// A file picked by the operator, held in memory until the save workflow uploads it.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name);
        Self {
            file_name,
            bytes,
            content_type,
        }
    }

    /// Read a local file. The content type is guessed from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let bytes = fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| StorageError::InvalidPath(format!("{} is not a file", path.display())))?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

fn guess_content_type(file_name: &str) -> Option<String> {
    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
