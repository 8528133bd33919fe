use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::profile::update_profile::ProfileUpdateError;
use crate::domain::users::user::{UserInfoPatch, UserRecord};

pub struct UpdateUserInfo<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> UpdateUserInfo<'a, R> {
    pub async fn execute(
        &self,
        email: &str,
        user_name: Option<String>,
    ) -> Result<UserRecord, ProfileUpdateError> {
        let user_name = user_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(ProfileUpdateError::MissingUserName)?;
        let patch = UserInfoPatch {
            user_name: Some(user_name),
            ..UserInfoPatch::default()
        };
        let user = self
            .repo
            .update_user_info(email, &patch)
            .await?
            .ok_or(ProfileUpdateError::NotFound)?;
        Ok(user.without_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryUserRepository;

    #[tokio::test]
    async fn renames_user() {
        let repo = InMemoryUserRepository::with_user("a@b.com", "alice", "pw");
        let uc = UpdateUserInfo { repo: &repo };
        let user = uc.execute("a@b.com", Some(" Alice ".into())).await.unwrap();
        assert_eq!(user.user_name, "Alice");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let repo = InMemoryUserRepository::with_user("a@b.com", "alice", "pw");
        let uc = UpdateUserInfo { repo: &repo };
        let err = uc.execute("a@b.com", Some("".into())).await.unwrap_err();
        assert!(matches!(err, ProfileUpdateError::MissingUserName));
    }
}
