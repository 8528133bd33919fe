use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::application::ports::image_store::{
    ImageObject, ImageStore, PROFILE_IMAGES_PREFIX, StorageBackendStatus, StorageError,
};
use crate::domain::users::profile_image::ImageBackend;

/// Path the served root is mounted under by the HTTP layer.
pub const PUBLIC_UPLOADS_PATH: &str = "/uploads";

/// Writes images below a directory the HTTP layer serves statically. No external
/// dependency, so it always reports itself as configured.
pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join(PROFILE_IMAGES_PREFIX)
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            anyhow::bail!("invalid storage key: {key}");
        }
        Ok(self.images_dir().join(key))
    }

    fn public_url(&self, origin: &str, key: &str) -> String {
        let origin = self
            .public_base_url
            .as_deref()
            .unwrap_or(origin)
            .trim_end_matches('/');
        format!("{origin}{PUBLIC_UPLOADS_PATH}/{PROFILE_IMAGES_PREFIX}/{key}")
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.images_dir()).await?;
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl ImageStore for LocalFileStore {
    fn backend(&self) -> ImageBackend {
        ImageBackend::Local
    }

    fn status(&self) -> StorageBackendStatus {
        StorageBackendStatus::Configured
    }

    async fn put(&self, object: &ImageObject<'_>) -> Result<String, StorageError> {
        let write_err = |source: anyhow::Error| StorageError::Write {
            backend: ImageBackend::Local,
            key: object.key.to_string(),
            source,
        };
        let path = self.path_for(object.key).map_err(write_err)?;
        if let Err(err) = self.write(&path, object.bytes).await {
            // Do not leave a truncated file behind for the static server to hand out.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(write_err(anyhow::Error::new(err).context(format!(
                "failed to write {}",
                path.display()
            ))));
        }
        tracing::debug!(path = %path.display(), size = object.bytes.len(), "local_image_written");
        Ok(self.public_url(object.origin, object.key))
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
