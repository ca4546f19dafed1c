use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::traits::{ObjectStore, StoredObject, content_type_for, normalize_key};
use crate::config::StorageConfig;

/// S3-compatible object store (AWS, MinIO, COS, OSS).
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    max_size: u64,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let bucket_name = config
            .bucket
            .as_deref()
            .ok_or_else(|| StorageError::Backend("storage.bucket is required for s3".into()))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Backend(e.to_string()))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        let mut bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            max_size: config.max_object_size,
        })
    }
}

fn backend_error(key: &str, err: S3Error) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StorageError::NotFound(key.to_string()),
        other => StorageError::Backend(other.to_string()),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }
        let key = normalize_key(key)?;
        let response = self
            .bucket
            .put_object_with_content_type(&key, data, &content_type_for(&key))
            .await
            .map_err(|e| backend_error(&key, e))?;
        if !(200..300).contains(&response.status_code()) {
            return Err(StorageError::Backend(format!(
                "put {key} returned status {}",
                response.status_code()
            )));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let key = normalize_key(key)?;
        let response = self
            .bucket
            .get_object(&key)
            .await
            .map_err(|e| backend_error(&key, e))?;
        match response.status_code() {
            200..=299 => Ok(StoredObject {
                bytes: response.bytes().to_vec(),
                content_type: content_type_for(&key),
            }),
            404 => Err(StorageError::NotFound(key)),
            status => Err(StorageError::Backend(format!(
                "get {key} returned status {status}"
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let key = normalize_key(key)?;
        match self.bucket.head_object(&key).await {
            Ok((_, status)) => Ok((200..300).contains(&status)),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        if !self.exists(key).await? {
            return Ok(false);
        }
        let key = normalize_key(key)?;
        self.bucket
            .delete_object(&key)
            .await
            .map_err(|e| backend_error(&key, e))?;
        Ok(true)
    }
}
