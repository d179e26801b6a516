pub mod config;
pub mod retry;
pub mod storage;

pub use config::{StorageBackend, StorageConfig};
pub use retry::{RetryPolicy, calculate_backoff, retry_with_backoff};
