use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::application::ports::image_store::PROFILE_IMAGES_PREFIX;

pub const ALLOWED_IMAGE_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// Owns a file the transport layer spooled to disk.
///
/// The file is removed exactly once: either through [`TempUpload::discard`] or, if the
/// owner is dropped first (request cancelled, early return), from `Drop`.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    released: bool,
}

impl TempUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn discard(mut self) {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "temp_upload_removed"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(error = ?err, path = %self.path.display(), "temp_upload_remove_failed")
            }
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "temp_upload_removed_on_drop"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(error = ?err, path = %self.path.display(), "temp_upload_remove_failed")
            }
        }
    }
}

/// An upload as handed over by the HTTP layer, before any validation.
#[derive(Debug)]
pub struct IncomingFile {
    pub mime_type: String,
    pub original_name: String,
    pub size: u64,
    pub temp: TempUpload,
}

/// A validated upload, ready for storage. Consumed by the storage fallback.
#[derive(Debug)]
pub struct UploadRequest {
    pub owner: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub original_name: String,
    pub key: String,
    temp: TempUpload,
}

impl UploadRequest {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Path of the object inside a bucket or under the served root.
    pub fn object_path(&self) -> String {
        format!("{}/{}", PROFILE_IMAGES_PREFIX, self.key)
    }

    pub async fn release(self) {
        self.temp.discard().await;
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("No image file uploaded")]
    MissingFile,
    #[error("Invalid file format. Only JPG, JPEG and PNG are allowed")]
    UnsupportedType { mime_type: String },
    #[error("Uploaded image is empty")]
    EmptyFile,
    #[error("Uploaded image could not be read")]
    Unreadable(#[source] std::io::Error),
}

/// Millisecond timestamps that never repeat within the process, so two uploads from the
/// same user in the same millisecond still get distinct keys.
#[derive(Debug, Default)]
pub struct StorageKeyClock {
    last: AtomicI64,
}

impl StorageKeyClock {
    pub fn next(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct TempFileGate {
    clock: StorageKeyClock,
}

impl TempFileGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn admit(
        &self,
        owner: &str,
        file: Option<IncomingFile>,
    ) -> Result<UploadRequest, ValidationError> {
        let file = file.ok_or(ValidationError::MissingFile)?;
        let mime_type = normalize_mime(&file.mime_type);

        if !ALLOWED_IMAGE_MIME_TYPES.contains(&mime_type.as_str()) {
            tracing::warn!(owner = %owner, mime_type = %file.mime_type, "profile_image_rejected_mime");
            file.temp.discard().await;
            return Err(ValidationError::UnsupportedType {
                mime_type: file.mime_type,
            });
        }

        let bytes = match tokio::fs::read(file.temp.path()).await {
            Ok(bytes) => bytes,
            Err(err) => {
                file.temp.discard().await;
                return Err(ValidationError::Unreadable(err));
            }
        };
        if bytes.is_empty() {
            file.temp.discard().await;
            return Err(ValidationError::EmptyFile);
        }

        let key = format!(
            "profile_{}_{}.{}",
            sanitize_identity(owner),
            self.clock.next(),
            extension_for(&file.original_name, &mime_type)
        );
        tracing::debug!(owner = %owner, key = %key, size = bytes.len(), declared_size = file.size, "profile_image_admitted");

        Ok(UploadRequest {
            owner: owner.to_string(),
            bytes,
            mime_type,
            original_name: file.original_name,
            key,
            temp: file.temp,
        })
    }
}

fn normalize_mime(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `@` and `.` (and anything else unsafe in a path or URL segment) become `_`.
pub fn sanitize_identity(identity: &str) -> String {
    identity
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The stored key's extension decides the served content type, so it is always one
/// of the image extensions and always agrees with the declared MIME type.
fn extension_for(original_name: &str, mime_type: &str) -> String {
    let canonical = if mime_type == "image/png" { "png" } else { "jpg" };
    let from_name = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match (from_name.as_deref(), canonical) {
        (Some("png"), "png") => "png".to_string(),
        (Some(ext @ ("jpg" | "jpeg")), "jpg") => ext.to_string(),
        _ => canonical.to_string(),
    }
}
