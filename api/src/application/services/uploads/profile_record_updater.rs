use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::profile_image::{ProfileImage, StoredImageRef};
use crate::domain::users::user::ProfilePatch;

#[derive(thiserror::Error, Debug)]
pub enum RecordUpdateError {
    #[error("user not found")]
    NotFound,
    #[error("failed to persist profile image")]
    Persistence(#[source] anyhow::Error),
}

/// The only write path for `profile_image`.
pub struct ProfileRecordUpdater<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> ProfileRecordUpdater<'a, R> {
    pub async fn apply(
        &self,
        owner: &str,
        stored: &StoredImageRef,
    ) -> Result<ProfileImage, RecordUpdateError> {
        if self
            .repo
            .find_by_email(owner)
            .await
            .map_err(RecordUpdateError::Persistence)?
            .is_none()
        {
            return Err(RecordUpdateError::NotFound);
        }

        let updated = self
            .repo
            .update_profile(owner, &ProfilePatch::profile_image(&stored.public_url))
            .await
            .map_err(RecordUpdateError::Persistence)?
            .ok_or(RecordUpdateError::NotFound)?;

        match updated.profile_image {
            Some(url) if url == stored.public_url => Ok(ProfileImage { profile_image: url }),
            other => Err(RecordUpdateError::Persistence(anyhow::anyhow!(
                "profile image after update is {:?}, expected {}",
                other,
                stored.public_url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::users::profile_image::ImageBackend;
    use crate::test_support::InMemoryUserRepository;

    fn stored(url: &str) -> StoredImageRef {
        StoredImageRef {
            public_url: url.to_string(),
            key: "k.png".into(),
            backend: ImageBackend::Remote,
        }
    }

    #[tokio::test]
    async fn writes_url_verbatim() {
        let repo = InMemoryUserRepository::with_user("a@b.com", "alice", "pw");
        let updater = ProfileRecordUpdater { repo: &repo };

        let out = updater
            .apply("a@b.com", &stored("https://storage.test/b/profile_images/k.png"))
            .await
            .unwrap();

        assert_eq!(out.profile_image, "https://storage.test/b/profile_images/k.png");
        assert_eq!(
            repo.profile_image("a@b.com").as_deref(),
            Some("https://storage.test/b/profile_images/k.png")
        );
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let repo = InMemoryUserRepository::default();
        let updater = ProfileRecordUpdater { repo: &repo };
        let err = updater
            .apply("ghost@b.com", &stored("https://x/y"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordUpdateError::NotFound));
    }

    #[tokio::test]
    async fn store_failure_is_persistence_error() {
        let repo = InMemoryUserRepository::with_user("a@b.com", "alice", "pw");
        repo.fail_updates(true);
        let updater = ProfileRecordUpdater { repo: &repo };
        let err = updater
            .apply("a@b.com", &stored("https://x/y"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordUpdateError::Persistence(_)));
        assert_eq!(repo.profile_image("a@b.com"), None);
    }
}
