use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::UserInfoPatch;

#[derive(Debug, Clone)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ChangePasswordError {
    #[error("oldPassword and newPassword are required")]
    MissingFields,
    #[error("User not found")]
    NotFound,
    #[error("Old password is incorrect")]
    IncorrectPassword,
    #[error("Failed to update password")]
    UpdateFailed,
    #[error("Error updating password")]
    Internal(#[from] anyhow::Error),
}

/// Replaces the password hash, then revokes the token the request was made with so the
/// client has to log in again.
pub struct ChangePassword<'a, R, B>
where
    R: UserRepository + ?Sized,
    B: TokenBlacklist + ?Sized,
{
    pub repo: &'a R,
    pub blacklist: &'a B,
}

impl<'a, R, B> ChangePassword<'a, R, B>
where
    R: UserRepository + ?Sized,
    B: TokenBlacklist + ?Sized,
{
    pub async fn execute(
        &self,
        email: &str,
        req: &ChangePasswordRequest,
        presented_token: Option<&str>,
    ) -> Result<(), ChangePasswordError> {
        if req.old_password.is_empty() || req.new_password.is_empty() {
            return Err(ChangePasswordError::MissingFields);
        }
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or(ChangePasswordError::NotFound)?;

        let current = user.password_hash.unwrap_or_default();
        let parsed = PasswordHash::new(&current).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if Argon2::default()
            .verify_password(req.old_password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(ChangePasswordError::IncorrectPassword);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.new_password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        let patch = UserInfoPatch {
            password_hash: Some(hash),
            ..UserInfoPatch::default()
        };
        if self.repo.update_user_info(email, &patch).await?.is_none() {
            return Err(ChangePasswordError::UpdateFailed);
        }

        if let Some(token) = presented_token {
            if !self.blacklist.is_blacklisted(token).await? {
                self.blacklist.blacklist(token).await?;
            }
        }
        tracing::info!(email = %email, "password_changed");
        Ok(())
    }
}
