use std::path::PathBuf;
use std::time::Duration;

use common::retry::RetryPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{StorageBackend, StorageConfig};

use crate::session::default_session_path;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the LMS REST API. Default: "http://localhost:7000/api".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds. Default: 30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:7000/api".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Tuning for the save workflows.
#[derive(Debug, Deserialize, Clone)]
pub struct SaveConfig {
    /// Attempts for the final asset-reference patch after create. Default: 3.
    #[serde(default = "default_patch_attempts")]
    pub patch_attempts: u8,
    /// Backoff base in milliseconds. Default: 200.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    /// Backoff ceiling in milliseconds. Default: 2000.
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

fn default_patch_attempts() -> u8 {
    3
}
fn default_retry_base_ms() -> u64 {
    200
}
fn default_retry_max_ms() -> u64 {
    2_000
}

impl SaveConfig {
    pub fn patch_retry(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.patch_attempts,
            base_ms: self.retry_base_ms,
            max_ms: self.retry_max_ms,
        }
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            patch_attempts: default_patch_attempts(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Session file. Default: `{config dir}/lms-admin/session.json`.
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub save: SaveConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AdminConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("LMS_ADMIN_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("api.base_url", default_base_url())?
            .set_default("api.timeout_secs", 30_i64)?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.bucket", "finalproject")?
            .set_default("save.patch_attempts", 3_i64)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., LMS_ADMIN__API__BASE_URL)
            .add_source(Environment::with_prefix("LMS_ADMIN").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
