use async_trait::async_trait;

use crate::domain::users::user::{ProfilePatch, UserInfoPatch, UserRecord};

/// Users are addressed by email, the identity carried in access tokens.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        user_name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRecord>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;
    /// Applies every present field of `patch` in one write. `None` when no user matches.
    async fn update_profile(
        &self,
        email: &str,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<UserRecord>>;
    async fn update_user_info(
        &self,
        email: &str,
        patch: &UserInfoPatch,
    ) -> anyhow::Result<Option<UserRecord>>;
}
