use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use super::error::StorageError;
use super::traits::{ObjectMeta, ObjectStore, validate_component};

/// Connection settings for an S3-compatible endpoint (AWS, MinIO, ...).
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Path-style addressing; required for MinIO.
    pub path_style: bool,
    pub max_size: u64,
}

/// Object store backed by an S3-compatible service.
///
/// Logical buckets map 1:1 to S3 buckets, which must already exist; this
/// store never creates buckets.
pub struct S3ObjectStore {
    settings: S3Settings,
    credentials: Credentials,
}

impl S3ObjectStore {
    pub fn new(settings: S3Settings) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("credentials: {e}")))?;

        Ok(Self {
            settings,
            credentials,
        })
    }

    fn bucket(&self, bucket: &str) -> Result<Box<Bucket>, StorageError> {
        validate_component(bucket)?;
        let region = Region::Custom {
            region: self.settings.region.clone(),
            endpoint: self.settings.endpoint.clone(),
        };
        let b = Bucket::new(bucket, region, self.credentials.clone()).map_err(map_s3_err)?;
        Ok(if self.settings.path_style {
            b.with_path_style()
        } else {
            b
        })
    }
}

fn map_s3_err(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn status_of(err: &S3Error) -> Option<u16> {
    match err {
        S3Error::HttpFailWithBody(code, _) => Some(*code),
        _ => None,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, bucket: &str, name: &str, body: &[u8]) -> Result<(), StorageError> {
        validate_component(name)?;
        if body.len() as u64 > self.settings.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: body.len() as u64,
                limit: self.settings.max_size,
            });
        }

        let b = self.bucket(bucket)?;
        b.put_object(name, body).await.map_err(map_s3_err)?;
        tracing::debug!(bucket, name, bytes = body.len(), "stored object");
        Ok(())
    }

    async fn get_object(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        validate_component(name)?;
        let b = self.bucket(bucket)?;
        match b.get_object(name).await {
            Ok(resp) => Ok(resp.bytes().to_vec()),
            Err(e) if status_of(&e) == Some(404) => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(map_s3_err(e)),
        }
    }

    async fn exists(&self, bucket: &str, name: &str) -> Result<bool, StorageError> {
        validate_component(name)?;
        let b = self.bucket(bucket)?;
        match b.head_object(name).await {
            Ok(_) => Ok(true),
            Err(e) if status_of(&e) == Some(404) => Ok(false),
            Err(e) => Err(map_s3_err(e)),
        }
    }

    async fn presign_get(
        &self,
        bucket: &str,
        name: &str,
        ttl_secs: u32,
    ) -> Result<String, StorageError> {
        validate_component(name)?;
        let b = self.bucket(bucket)?;
        b.presign_get(name, ttl_secs, None).await.map_err(map_s3_err)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectMeta>, StorageError> {
        let b = self.bucket(bucket)?;
        let pages = b
            .list(prefix.to_string(), None)
            .await
            .map_err(map_s3_err)?;

        let mut objects = Vec::new();
        for page in pages {
            for obj in page.contents {
                let last_modified = DateTime::parse_from_rfc3339(&obj.last_modified)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc));
                objects.push(ObjectMeta {
                    name: obj.key,
                    size: obj.size,
                    last_modified,
                    etag: obj.e_tag.map(|t| t.trim_matches('"').to_string()),
                });
            }
        }
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }
}
