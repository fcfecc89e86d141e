use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use super::error::StorageError;
use super::traits::{ObjectMeta, ObjectStore, validate_component};

/// Filesystem-backed object store.
///
/// Layout: `{root}/{bucket}/{name}`. Writes go through a temp file under
/// `{root}/.tmp` followed by a rename, so a crashed put never leaves a
/// half-written object at the final name.
pub struct FilesystemObjectStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemObjectStore {
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn object_path(&self, bucket: &str, name: &str) -> Result<PathBuf, StorageError> {
        validate_component(bucket)?;
        validate_component(name)?;
        Ok(self.root.join(bucket).join(name))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put_object(&self, bucket: &str, name: &str, body: &[u8]) -> Result<(), StorageError> {
        if body.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: body.len() as u64,
                limit: self.max_size,
            });
        }

        let object_path = self.object_path(bucket, name)?;
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, body).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        tracing::debug!(bucket, name, bytes = body.len(), "stored object");

        Ok(())
    }

    async fn get_object(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        let object_path = self.object_path(bucket, name)?;
        match fs::read(&object_path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, bucket: &str, name: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(bucket, name)?;
        Ok(fs::try_exists(&object_path).await?)
    }

    async fn presign_get(
        &self,
        bucket: &str,
        name: &str,
        _ttl_secs: u32,
    ) -> Result<String, StorageError> {
        // No signing authority on a local filesystem; the file URL stands in
        // for a presigned link in development setups.
        let object_path = self.object_path(bucket, name)?;
        if !fs::try_exists(&object_path).await? {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                name: name.to_string(),
            });
        }
        let absolute = fs::canonicalize(&object_path).await?;
        Ok(format!("file://{}", absolute.display()))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectMeta>, StorageError> {
        validate_component(bucket)?;
        let bucket_path = self.root.join(bucket);

        let mut dir = match fs::read_dir(&bucket_path).await {
            Ok(dir) => dir,
            // A bucket nothing was ever written to lists as empty.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(prefix) {
                continue;
            }

            let last_modified = meta.modified().ok().map(DateTime::<Utc>::from);
            // Metadata-derived tag, same shape httpd uses. Listing stays
            // O(entries) instead of reading every stored body back.
            let etag = last_modified
                .map(|m| format!("{:x}-{:x}", m.timestamp_nanos_opt().unwrap_or(0), meta.len()));

            objects.push(ObjectMeta {
                name,
                size: meta.len(),
                last_modified,
                etag,
            });
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }
}
