//! Dual-write lifecycle for bundle-backed resources.
//!
//! Every template, assignment, and attempt is a pair: a relational record and
//! a files-bundle object in blob storage. The two stores share no transaction,
//! so the order of operations carries the consistency guarantees:
//!
//! * Create: insert record (NULL pointer) → write bundle at the name derived
//!   from the new id → patch the pointer. A failure after the insert leaves an
//!   orphaned record, surfaced as [`AppError::PartialWrite`] and repairable
//!   via [`repair`].
//! * Update: bundle write precedes the record patch, so a stored pointer
//!   never names content that does not exist. The converse order is forbidden.
//! * Read: the object name is always recomputed from kind + id; the stored
//!   pointer is a cached locator, never the source of truth.
//!
//! Concurrent updates to the same id are not serialized: the last record
//! patch wins, and it is not guaranteed to pair with the last bundle write.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::bundle::{self, FilesMap};
use common::storage::{ObjectMeta, ObjectStore, StorageError};
use sea_orm::{ConnectionTrait, DbErr};

use crate::error::AppError;

/// Derive the blob object name for a resource. The single derivation used by
/// create, read, update, and repair alike.
pub fn object_name(kind: &str, id: i32) -> String {
    format!("{kind}-{id}.json")
}

/// Durable locator stored in the record's `blob_pointer` column.
pub fn locator(bucket: &str, name: &str) -> String {
    format!("{bucket}/{name}")
}

/// Inverse of [`object_name`], used when sweeping buckets for strays.
pub fn parse_object_name(kind: &str, name: &str) -> Option<i32> {
    name.strip_prefix(kind)?
        .strip_prefix('-')?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Blob-store half of the coordinator: the store plus the operational policy
/// (per-call deadline, presign lifetime, size limit) applied to every call.
#[derive(Clone)]
pub struct BlobSide {
    pub store: Arc<dyn ObjectStore>,
    pub op_timeout: Duration,
    pub presign_ttl_secs: u32,
    pub max_blob_size: u64,
}

impl BlobSide {
    async fn run<T>(
        &self,
        fut: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .unwrap_or_else(|_| Err(StorageError::Timeout(self.op_timeout)))
    }

    pub async fn put(&self, bucket: &str, name: &str, body: &[u8]) -> Result<(), StorageError> {
        self.run(self.store.put_object(bucket, name, body)).await
    }

    pub async fn get(&self, bucket: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        self.run(self.store.get_object(bucket, name)).await
    }

    pub async fn exists(&self, bucket: &str, name: &str) -> Result<bool, StorageError> {
        self.run(self.store.exists(bucket, name)).await
    }

    pub async fn presign(&self, bucket: &str, name: &str) -> Result<String, StorageError> {
        self.run(self.store.presign_get(bucket, name, self.presign_ttl_secs))
            .await
    }

    pub async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>, StorageError> {
        self.run(self.store.list_objects(bucket, prefix)).await
    }
}

/// Record-side metadata every dual-write record exposes.
pub trait RecordMeta {
    fn id(&self) -> i32;
    fn blob_pointer(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
}

/// A resource kind participating in the dual-write lifecycle.
///
/// Implementations supply the relational operations; the coordinator supplies
/// the ordering, naming, and error semantics.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Object-name prefix and log label, e.g. "template".
    const KIND: &'static str;
    /// Capitalized form for user-facing messages.
    const LABEL: &'static str;
    /// Logical bucket holding this kind's bundles.
    const BUCKET: &'static str;

    type Record: RecordMeta + Send + Sync;
    type CreateFields: Send + 'static;
    type UpdateFields: Send + 'static;

    async fn insert<C: ConnectionTrait>(
        db: &C,
        fields: Self::CreateFields,
        now: DateTime<Utc>,
    ) -> Result<Self::Record, DbErr>;

    async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Self::Record>, DbErr>;

    async fn set_pointer<C: ConnectionTrait>(
        db: &C,
        id: i32,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<Self::Record, DbErr>;

    async fn apply_update<C: ConnectionTrait>(
        db: &C,
        record: Self::Record,
        fields: Self::UpdateFields,
        pointer: &str,
        now: DateTime<Utc>,
    ) -> Result<Self::Record, DbErr>;

    /// All records of the kind, most recently touched first.
    async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<Self::Record>, DbErr>;

    /// Records whose pointer patch never completed.
    async fn find_orphans<C: ConnectionTrait>(db: &C) -> Result<Vec<Self::Record>, DbErr>;
}

/// Combined view returned on single-item reads.
pub struct Combined<R> {
    pub record: R,
    /// `None` means the record exists but its payload is unavailable
    /// (partial creation), not "empty bundle".
    pub files: Option<FilesMap>,
    /// Fresh presigned retrieval URL; never persisted.
    pub download_url: Option<String>,
}

fn not_found<K: Resource>() -> AppError {
    AppError::NotFound(format!("{} not found", K::LABEL))
}

fn partial_write<K: Resource>(id: i32, detail: impl std::fmt::Display) -> AppError {
    AppError::PartialWrite {
        record: format!("{} {id}", K::KIND),
        detail: detail.to_string(),
    }
}

/// Create the {record, bundle} pair.
pub async fn create<K: Resource, C: ConnectionTrait>(
    db: &C,
    blobs: &BlobSide,
    fields: K::CreateFields,
    files: &FilesMap,
) -> Result<K::Record, AppError> {
    bundle::validate(files, blobs.max_blob_size)?;
    // Serialization is pure, so doing it before the insert means a bad bundle
    // can never orphan a record.
    let body = bundle::encode(files)?;

    let now = Utc::now();
    let record = K::insert(db, fields, now).await?;
    let id = record.id();

    let name = object_name(K::KIND, id);
    blobs
        .put(K::BUCKET, &name, &body)
        .await
        .map_err(|e| partial_write::<K>(id, e))?;

    let pointer = locator(K::BUCKET, &name);
    K::set_pointer(db, id, &pointer, now)
        .await
        .map_err(|e| partial_write::<K>(id, format!("pointer patch failed: {e}")))
}

/// Fetch the combined view of one resource.
pub async fn read_one<K: Resource, C: ConnectionTrait>(
    db: &C,
    blobs: &BlobSide,
    id: i32,
) -> Result<Combined<K::Record>, AppError> {
    let record = K::find(db, id).await?.ok_or_else(not_found::<K>)?;

    if record.blob_pointer().is_none() {
        // Partial creation: report the record alone, skip the blob fetch.
        return Ok(Combined {
            record,
            files: None,
            download_url: None,
        });
    }

    let name = object_name(K::KIND, id);
    let body = blobs.get(K::BUCKET, &name).await?;
    let files = bundle::decode(&body)
        .map_err(|e| AppError::CorruptPayload(format!("{}/{name}: {e}", K::BUCKET)))?;

    // The presigned link is a convenience; its failure does not void the read.
    let download_url = match blobs.presign(K::BUCKET, &name).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(kind = K::KIND, id, "presign failed: {e}");
            None
        }
    };

    Ok(Combined {
        record,
        files: Some(files),
        download_url,
    })
}

/// Replace the bundle and patch the record.
pub async fn update<K: Resource, C: ConnectionTrait>(
    db: &C,
    blobs: &BlobSide,
    id: i32,
    fields: K::UpdateFields,
    files: &FilesMap,
) -> Result<K::Record, AppError> {
    bundle::validate(files, blobs.max_blob_size)?;
    let body = bundle::encode(files)?;

    // Existence check up front so a bogus id never writes a stray object.
    let existing = K::find(db, id).await?.ok_or_else(not_found::<K>)?;

    let name = object_name(K::KIND, id);
    blobs.put(K::BUCKET, &name, &body).await?;

    let pointer = locator(K::BUCKET, &name);
    let now = Utc::now();
    K::apply_update(db, existing, fields, &pointer, now)
        .await
        .map_err(|e| partial_write::<K>(id, format!("record patch after bundle write: {e}")))
}

/// Metadata-only listing, most recently updated first.
pub async fn list<K: Resource, C: ConnectionTrait>(db: &C) -> Result<Vec<K::Record>, AppError> {
    Ok(K::list(db).await?)
}

/// Records stuck in partial creation (NULL pointer).
pub async fn orphan_records<K: Resource, C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<K::Record>, AppError> {
    Ok(K::find_orphans(db).await?)
}

/// Bundle objects in the kind's bucket that no record points at, plus any
/// object whose name does not parse as this kind at all.
pub async fn unreferenced_objects<K: Resource, C: ConnectionTrait>(
    db: &C,
    blobs: &BlobSide,
) -> Result<Vec<ObjectMeta>, AppError> {
    let objects = blobs.list(K::BUCKET, "").await?;
    let ids: HashSet<i32> = K::list(db).await?.iter().map(|r| r.id()).collect();

    Ok(objects
        .into_iter()
        .filter(|o| match parse_object_name(K::KIND, &o.name) {
            Some(id) => !ids.contains(&id),
            None => true,
        })
        .collect())
}

/// Complete an interrupted create: if the derived bundle object exists, patch
/// the record's pointer. Returns the record and whether a patch happened.
pub async fn repair<K: Resource, C: ConnectionTrait>(
    db: &C,
    blobs: &BlobSide,
    id: i32,
) -> Result<(K::Record, bool), AppError> {
    let record = K::find(db, id).await?.ok_or_else(not_found::<K>)?;

    if record.blob_pointer().is_some() {
        return Ok((record, false));
    }

    let name = object_name(K::KIND, id);
    if !blobs.exists(K::BUCKET, &name).await? {
        return Err(AppError::Conflict(format!(
            "No stored bundle for {} {id}; the resource must be re-created",
            K::KIND
        )));
    }

    let pointer = locator(K::BUCKET, &name);
    let record = K::set_pointer(db, id, &pointer, Utc::now()).await?;
    tracing::info!(kind = K::KIND, id, "repaired orphaned record");
    Ok((record, true))
}
