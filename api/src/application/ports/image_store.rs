use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::users::profile_image::ImageBackend;

/// Prefix shared by both backends, both in bucket paths and under the served root.
pub const PROFILE_IMAGES_PREFIX: &str = "profile_images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendStatus {
    Configured,
    Unavailable { reason: String },
}

impl StorageBackendStatus {
    pub fn is_configured(&self) -> bool {
        matches!(self, StorageBackendStatus::Configured)
    }
}

#[derive(Debug, Clone)]
pub struct ImageObject<'a> {
    pub key: &'a str,
    pub bytes: &'a [u8],
    pub content_type: &'a str,
    pub metadata: &'a HashMap<String, String>,
    /// `scheme://host` of the request being served, used by backends that hand out
    /// URLs relative to this service.
    pub origin: &'a str,
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("{backend} storage is unavailable: {reason}")]
    Unavailable {
        backend: ImageBackend,
        reason: String,
    },
    #[error("failed to write {key} to {backend} storage")]
    Write {
        backend: ImageBackend,
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to make {key} publicly readable")]
    Publish {
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{backend} storage did not answer within {timeout:?}")]
    TimedOut {
        backend: ImageBackend,
        timeout: Duration,
    },
    #[error("Failed to upload file to any storage system")]
    Exhausted {
        remote: Box<StorageError>,
        local: Box<StorageError>,
    },
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    fn backend(&self) -> ImageBackend;
    fn status(&self) -> StorageBackendStatus;
    /// Stores the object and returns an absolute URL a plain GET can fetch.
    async fn put(&self, object: &ImageObject<'_>) -> Result<String, StorageError>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}
