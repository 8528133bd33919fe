use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::image_store::{
    ImageObject, ImageStore, PROFILE_IMAGES_PREFIX, StorageBackendStatus, StorageError,
};
use crate::application::ports::object_bucket::{ObjectBucket, SaveOptions};
use crate::domain::users::profile_image::ImageBackend;

/// Images in a remote bucket, publicly readable at `https://<host>/<bucket>/<path>`.
pub struct RemoteObjectStore {
    bucket: Option<Arc<dyn ObjectBucket>>,
    status: StorageBackendStatus,
}

impl RemoteObjectStore {
    pub fn configured(bucket: Arc<dyn ObjectBucket>) -> Self {
        Self {
            bucket: Some(bucket),
            status: StorageBackendStatus::Configured,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            bucket: None,
            status: StorageBackendStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    fn ready_bucket(&self) -> Result<&Arc<dyn ObjectBucket>, StorageError> {
        match (&self.status, &self.bucket) {
            (StorageBackendStatus::Configured, Some(bucket)) => Ok(bucket),
            (StorageBackendStatus::Unavailable { reason }, _) => Err(StorageError::Unavailable {
                backend: ImageBackend::Remote,
                reason: reason.clone(),
            }),
            (StorageBackendStatus::Configured, None) => Err(StorageError::Unavailable {
                backend: ImageBackend::Remote,
                reason: "no bucket handle".into(),
            }),
        }
    }
}

fn object_path(key: &str) -> String {
    format!("{PROFILE_IMAGES_PREFIX}/{key}")
}

#[async_trait]
impl ImageStore for RemoteObjectStore {
    fn backend(&self) -> ImageBackend {
        ImageBackend::Remote
    }

    fn status(&self) -> StorageBackendStatus {
        self.status.clone()
    }

    async fn put(&self, object: &ImageObject<'_>) -> Result<String, StorageError> {
        let bucket = self.ready_bucket()?;
        let path = object_path(object.key);

        bucket
            .save(
                &path,
                object.bytes,
                SaveOptions {
                    content_type: object.content_type,
                    metadata: object.metadata,
                    public: true,
                },
            )
            .await
            .map_err(|source| StorageError::Write {
                backend: ImageBackend::Remote,
                key: object.key.to_string(),
                source,
            })?;
        if let Err(source) = bucket.make_public(&path).await {
            // The object was written but will never be referenced.
            if let Err(err) = bucket.delete(&path).await {
                tracing::warn!(error = ?err, path = %path, "unpublished_remote_image_remove_failed");
            }
            return Err(StorageError::Publish {
                key: object.key.to_string(),
                source,
            });
        }

        Ok(format!(
            "https://{}/{}/{}",
            bucket.public_host(),
            bucket.name(),
            path
        ))
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let bucket = self.ready_bucket()?;
        bucket.delete(&object_path(key)).await
    }
}
