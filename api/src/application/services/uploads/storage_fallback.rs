use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::image_store::{
    ImageObject, ImageStore, StorageBackendStatus, StorageError,
};
use crate::application::services::uploads::temp_file_gate::UploadRequest;
use crate::domain::users::profile_image::{ImageBackend, StoredImageRef};

/// Remote object storage first, local served directory second.
pub struct StorageFallback {
    remote: Arc<dyn ImageStore>,
    local: Arc<dyn ImageStore>,
    remote_timeout: Duration,
}

impl StorageFallback {
    pub fn new(
        remote: Arc<dyn ImageStore>,
        local: Arc<dyn ImageStore>,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            remote,
            local,
            remote_timeout,
        }
    }

    pub fn remote_status(&self) -> StorageBackendStatus {
        self.remote.status()
    }

    /// Stores the request on the first backend that accepts it. The request's temp file
    /// is gone when this returns, whatever the outcome.
    pub async fn upload(
        &self,
        request: UploadRequest,
        origin: &str,
    ) -> Result<StoredImageRef, StorageError> {
        let outcome = self.store(&request, origin).await;
        request.release().await;
        outcome
    }

    /// Best-effort removal of an object that will not be referenced after all.
    pub async fn discard(&self, stored: &StoredImageRef) {
        let store = match stored.backend {
            ImageBackend::Remote => &self.remote,
            ImageBackend::Local => &self.local,
        };
        match store.remove(&stored.key).await {
            Ok(()) => {
                tracing::info!(key = %stored.key, backend = %stored.backend, "orphaned_profile_image_removed")
            }
            Err(err) => {
                tracing::warn!(error = ?err, key = %stored.key, backend = %stored.backend, "orphaned_profile_image_remove_failed")
            }
        }
    }

    async fn store(
        &self,
        request: &UploadRequest,
        origin: &str,
    ) -> Result<StoredImageRef, StorageError> {
        let metadata = HashMap::from([
            ("uploadedBy".to_string(), request.owner.clone()),
            ("uploadedAt".to_string(), chrono::Utc::now().to_rfc3339()),
        ]);
        let object = ImageObject {
            key: &request.key,
            bytes: &request.bytes,
            content_type: &request.mime_type,
            metadata: &metadata,
            origin,
        };

        let remote_err = match self.try_remote(&object).await {
            Ok(public_url) => {
                return Ok(self.served_by(self.remote.backend(), request, public_url));
            }
            Err(err) => {
                tracing::warn!(error = %err, key = %request.key, "remote_image_upload_failed_falling_back");
                err
            }
        };

        match self.local.put(&object).await {
            Ok(public_url) => Ok(self.served_by(self.local.backend(), request, public_url)),
            Err(local_err) => {
                tracing::error!(
                    remote_error = ?remote_err,
                    local_error = ?local_err,
                    key = %request.key,
                    "image_upload_failed_on_all_backends"
                );
                Err(StorageError::Exhausted {
                    remote: Box::new(remote_err),
                    local: Box::new(local_err),
                })
            }
        }
    }

    async fn try_remote(&self, object: &ImageObject<'_>) -> Result<String, StorageError> {
        let backend = self.remote.backend();
        if let StorageBackendStatus::Unavailable { reason } = self.remote.status() {
            return Err(StorageError::Unavailable { backend, reason });
        }
        match tokio::time::timeout(self.remote_timeout, self.remote.put(object)).await {
            Ok(result) => result,
            Err(_) => {
                self.remove_abandoned_remote(object.key).await;
                Err(StorageError::TimedOut {
                    backend,
                    timeout: self.remote_timeout,
                })
            }
        }
    }

    /// A timed-out write may still have landed; the key is never handed out, so clear it.
    async fn remove_abandoned_remote(&self, key: &str) {
        match tokio::time::timeout(self.remote_timeout, self.remote.remove(key)).await {
            Ok(Ok(())) => tracing::debug!(key = %key, "abandoned_remote_image_removed"),
            Ok(Err(err)) => {
                tracing::warn!(error = ?err, key = %key, "abandoned_remote_image_remove_failed")
            }
            Err(_) => tracing::warn!(key = %key, "abandoned_remote_image_remove_timed_out"),
        }
    }

    fn served_by(
        &self,
        backend: ImageBackend,
        request: &UploadRequest,
        public_url: String,
    ) -> StoredImageRef {
        tracing::info!(backend = %backend, key = %request.key, url = %public_url, "profile_image_stored");
        StoredImageRef {
            public_url,
            key: request.key.clone(),
            backend,
        }
    }
}
