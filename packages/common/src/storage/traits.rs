use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::StorageError;

/// Listing entry returned by [`ObjectStore::list_objects`].
#[derive(Debug, Clone, Serialize)]
pub struct ObjectMeta {
    pub name: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Named-object blob storage.
///
/// Objects live under a logical bucket and a caller-chosen name. A put to an
/// existing name replaces the previous body wholesale.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` at `bucket`/`name`, overwriting any prior content.
    async fn put_object(&self, bucket: &str, name: &str, body: &[u8]) -> Result<(), StorageError>;

    /// Retrieve the full body of an object.
    async fn get_object(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, bucket: &str, name: &str) -> Result<bool, StorageError>;

    /// Produce a time-limited retrieval URL for an object.
    ///
    /// The URL is ephemeral; callers must not persist it as the object's
    /// location of record.
    async fn presign_get(
        &self,
        bucket: &str,
        name: &str,
        ttl_secs: u32,
    ) -> Result<String, StorageError>;

    /// List objects in a bucket whose names start with `prefix`.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectMeta>, StorageError>;
}

/// Validate a bucket or object name component.
///
/// Names are flat: no separators, no traversal, printable ASCII subset only.
pub(crate) fn validate_component(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.len() > 255 {
        return Err(StorageError::InvalidName(format!(
            "name must be 1-255 bytes, got {}",
            name.len()
        )));
    }
    if name == "." || name == ".." {
        return Err(StorageError::InvalidName(format!("reserved name {name:?}")));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(StorageError::InvalidName(format!(
            "name {name:?} contains characters outside [A-Za-z0-9._-]"
        )));
    }
    Ok(())
}
