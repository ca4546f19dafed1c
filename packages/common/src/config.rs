use std::path::PathBuf;

use serde::Deserialize;

/// Which object storage backend serves avatars and icons.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// Object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend selector. Default: filesystem.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend. Default: "./data/objects".
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Largest accepted object in bytes. Default: 5 MiB.
    #[serde(default = "default_max_object_size")]
    pub max_object_size: u64,
    /// Bucket name (s3 only).
    #[serde(default)]
    pub bucket: Option<String>,
    /// Region name (s3 only). Default: "us-east-1".
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services such as MinIO or COS.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style bucket addressing. Default: false.
    #[serde(default)]
    pub path_style: bool,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/objects")
}
fn default_max_object_size() -> u64 {
    5 * 1024 * 1024
}
fn default_region() -> String {
    "us-east-1".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            max_object_size: default_max_object_size(),
            bucket: None,
            region: default_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            path_style: false,
        }
    }
}
