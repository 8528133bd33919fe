use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::UserRecord;

#[derive(thiserror::Error, Debug)]
pub enum RegisterError {
    #[error("email and password are required")]
    MissingFields,
    #[error("User already exists")]
    AlreadyExists,
    #[error("Error registering user")]
    Internal(#[from] anyhow::Error),
}

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub user_name: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> Result<UserRecord, RegisterError> {
        let email = req.email.trim();
        if email.is_empty() || req.password.is_empty() {
            return Err(RegisterError::MissingFields);
        }
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(RegisterError::AlreadyExists);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        let user = self
            .repo
            .create_user(email, req.user_name.trim(), &hash)
            .await?;
        Ok(user.without_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryUserRepository;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            user_name: " alice ".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn creates_user_with_hashed_password() {
        let repo = InMemoryUserRepository::default();
        let user = Register { repo: &repo }
            .execute(&request(" a@b.com ", "s3cret"))
            .await
            .unwrap();

        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.user_name, "alice");
        assert!(user.password_hash.is_none());
        let stored = repo.user("a@b.com").unwrap();
        assert!(stored.password_hash.unwrap().starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::with_user("a@b.com", "alice", "pw");
        let err = Register { repo: &repo }
            .execute(&request("a@b.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::AlreadyExists));
    }

    #[tokio::test]
    async fn blank_password_is_rejected() {
        let repo = InMemoryUserRepository::default();
        let err = Register { repo: &repo }
            .execute(&request("a@b.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::MissingFields));
    }
}
