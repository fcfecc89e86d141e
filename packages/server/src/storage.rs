use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::storage::ObjectStore;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::s3::{S3ObjectStore, S3Settings};

use crate::config::StorageConfig;
use crate::coordinator::BlobSide;

/// Build the blob side of the dual store from configuration.
pub async fn build_blob_side(cfg: &StorageConfig) -> anyhow::Result<BlobSide> {
    let store: Arc<dyn ObjectStore> = match cfg.backend.as_str() {
        "filesystem" => Arc::new(
            FilesystemObjectStore::new(PathBuf::from(&cfg.root), cfg.max_blob_size).await?,
        ),
        "s3" => {
            let s3 = cfg
                .s3
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("storage.backend is 's3' but storage.s3 is unset"))?;
            Arc::new(S3ObjectStore::new(S3Settings {
                endpoint: s3.endpoint.clone(),
                region: s3.region.clone(),
                access_key: s3.access_key.clone(),
                secret_key: s3.secret_key.clone(),
                path_style: s3.path_style,
                max_size: cfg.max_blob_size,
            })?)
        }
        other => anyhow::bail!("Unknown storage backend '{other}'; expected filesystem or s3"),
    };

    Ok(BlobSide {
        store,
        op_timeout: Duration::from_secs(cfg.operation_timeout_secs),
        presign_ttl_secs: cfg.presign_ttl_secs,
        max_blob_size: cfg.max_blob_size,
    })
}
