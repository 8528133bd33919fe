use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::UserRecord;

pub struct GetProfile<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetProfile<'a, R> {
    pub async fn execute(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self
            .repo
            .find_by_email(email)
            .await?
            .map(UserRecord::without_secret))
    }
}
