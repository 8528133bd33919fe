use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{ProfilePatch, UserRecord};

#[derive(thiserror::Error, Debug)]
pub enum ProfileUpdateError {
    #[error("Please provide at least one profile information field")]
    EmptyPatch,
    #[error("userName is required")]
    MissingUserName,
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

pub struct UpdateProfile<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> UpdateProfile<'a, R> {
    pub async fn execute(
        &self,
        email: &str,
        patch: ProfilePatch,
    ) -> Result<UserRecord, ProfileUpdateError> {
        // profile_image only changes through the upload pipeline.
        let patch = ProfilePatch {
            profile_image: None,
            ..patch
        }
        .normalized();
        if patch.is_empty() {
            return Err(ProfileUpdateError::EmptyPatch);
        }
        tracing::debug!(email = %email, fields = ?patch.present_fields(), "profile_update");
        let user = self
            .repo
            .update_profile(email, &patch)
            .await?
            .ok_or(ProfileUpdateError::NotFound)?;
        Ok(user.without_secret())
    }
}
