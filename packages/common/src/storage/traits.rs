use async_trait::async_trait;

use super::error::StorageError;

/// An object read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    /// MIME type guessed from the key's extension.
    pub content_type: String,
}

/// Path-keyed object storage for user-facing assets (avatars, icons).
///
/// Keys are relative, `/`-separated paths such as `avatar/user/<name>.png`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve the object stored under `key`.
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Normalize an object key: strip surrounding slashes and reject empty,
/// `.` or `..` segments.
pub fn normalize_key(key: &str) -> Result<String, StorageError> {
    let trimmed = key.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".into()));
    }
    for segment in trimmed.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
    }
    Ok(trimmed.to_string())
}

pub(crate) fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
