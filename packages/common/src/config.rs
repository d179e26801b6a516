use serde::Deserialize;

/// Which object-storage backend holds uploaded assets.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A local directory acting as the bucket.
    #[default]
    Filesystem,
    /// An S3-compatible bucket (requires the `object-storage` feature).
    S3,
}

/// Object-storage configuration shared by every asset-backed entity.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend selection. Default: filesystem.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket name. Also the marker used to recover object paths from public URLs.
    /// Default: "finalproject".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Prefix of every public URL; the bucket name and object path are appended.
    /// Default: "http://localhost:9000/storage/v1/object/public".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Root directory for the filesystem backend. Default: "./data/objects".
    #[serde(default = "default_root")]
    pub root: String,
    /// Maximum accepted object size in bytes. Default: 10 MiB.
    #[serde(default = "default_max_object_size")]
    pub max_object_size: u64,
    /// S3 endpoint, e.g. "https://<project>.supabase.co/storage/v1/s3".
    #[serde(default)]
    pub endpoint: Option<String>,
    /// S3 region. Default: "us-east-1".
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

fn default_bucket() -> String {
    "finalproject".into()
}
fn default_public_base_url() -> String {
    "http://localhost:9000/storage/v1/object/public".into()
}
fn default_root() -> String {
    "./data/objects".into()
}
fn default_max_object_size() -> u64 {
    10 * 1024 * 1024
}
fn default_region() -> String {
    "us-east-1".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            public_base_url: default_public_base_url(),
            root: default_root(),
            max_object_size: default_max_object_size(),
            endpoint: None,
            region: default_region(),
            access_key: None,
            secret_key: None,
        }
    }
}
