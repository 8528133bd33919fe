mod local_store;
mod remote_store;
mod s3_bucket;

use std::sync::Arc;

pub use local_store::{LocalFileStore, PUBLIC_UPLOADS_PATH};
pub use remote_store::RemoteObjectStore;
pub use s3_bucket::S3Bucket;

use crate::application::ports::object_bucket::ObjectBucket;
use crate::application::services::uploads::storage_fallback::StorageFallback;
use crate::bootstrap::config::Config;

/// Remote store status is decided here, once: no bucket configured, a client that fails
/// to build, or a failed probe all yield an explicitly unavailable remote store.
pub async fn build_remote_store(cfg: &Config) -> RemoteObjectStore {
    if cfg.s3_bucket.is_none() {
        tracing::warn!("remote_storage_not_configured_using_local_only");
        return RemoteObjectStore::unavailable("S3_BUCKET is not configured");
    }
    let bucket = match S3Bucket::new(cfg).await {
        Ok(bucket) => bucket,
        Err(err) => {
            tracing::error!(error = ?err, "remote_storage_init_failed");
            return RemoteObjectStore::unavailable(format!("client init failed: {err}"));
        }
    };
    match bucket.probe().await {
        Ok(()) => {
            tracing::info!(bucket = %bucket.name(), "remote_storage_connected");
            RemoteObjectStore::configured(Arc::new(bucket))
        }
        Err(err) => {
            tracing::error!(error = ?err, bucket = %bucket.name(), "remote_storage_probe_failed");
            RemoteObjectStore::unavailable(format!("bucket probe failed: {err}"))
        }
    }
}

pub async fn build_storage_fallback(cfg: &Config) -> StorageFallback {
    let remote = build_remote_store(cfg).await;
    let local = LocalFileStore::new(&cfg.storage_root, cfg.public_base_url.clone());
    StorageFallback::new(
        Arc::new(remote),
        Arc::new(local),
        cfg.remote_upload_timeout(),
    )
}
