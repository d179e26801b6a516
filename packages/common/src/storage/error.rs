use std::fmt;

/// Errors that can occur during object storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested object was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The object path is not a valid bucket key.
    InvalidPath(String),
    /// The object exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The bucket refused the object (size, type or policy).
    Rejected { status: u16, message: String },
    /// The storage service could not be reached or returned garbage.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "object not found: {path}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidPath(msg) => write!(f, "invalid object path: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "object exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::Rejected { status, message } => {
                write!(f, "bucket rejected object (status {status}): {message}")
            }
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
