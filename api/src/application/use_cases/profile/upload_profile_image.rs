use crate::application::ports::image_store::StorageError;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::uploads::profile_record_updater::{
    ProfileRecordUpdater, RecordUpdateError,
};
use crate::application::services::uploads::storage_fallback::StorageFallback;
use crate::application::services::uploads::temp_file_gate::{
    IncomingFile, TempFileGate, ValidationError,
};
use crate::domain::users::profile_image::ProfileImage;

/// Terminal failure states of an upload. Every one of them implies the temp file is gone.
#[derive(thiserror::Error, Debug)]
pub enum UploadProfileImageError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),
    #[error(transparent)]
    StorageFailed(#[from] StorageError),
    #[error("User not found - could not update profile in database")]
    RecordNotFound,
    #[error("Failed to save profile image")]
    PersistenceFailed(#[source] anyhow::Error),
}

/// Received -> Validated -> Stored -> Persisted.
pub struct UploadProfileImage<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub gate: &'a TempFileGate,
    pub storage: &'a StorageFallback,
}

impl<'a, R: UserRepository + ?Sized> UploadProfileImage<'a, R> {
    pub async fn execute(
        &self,
        owner: &str,
        file: Option<IncomingFile>,
        origin: &str,
    ) -> Result<ProfileImage, UploadProfileImageError> {
        let request = self.gate.admit(owner, file).await?;
        let stored = self.storage.upload(request, origin).await?;

        let updater = ProfileRecordUpdater { repo: self.repo };
        match updater.apply(owner, &stored).await {
            Ok(profile) => {
                tracing::info!(owner = %owner, backend = %stored.backend, "profile_image_saved");
                Ok(profile)
            }
            Err(err) => {
                tracing::error!(error = ?err, owner = %owner, key = %stored.key, "profile_image_record_update_failed");
                // Nothing will ever reference the object now.
                self.storage.discard(&stored).await;
                Err(match err {
                    RecordUpdateError::NotFound => UploadProfileImageError::RecordNotFound,
                    RecordUpdateError::Persistence(source) => {
                        UploadProfileImageError::PersistenceFailed(source)
                    }
                })
            }
        }
    }
}
