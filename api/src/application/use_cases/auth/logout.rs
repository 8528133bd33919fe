use crate::application::ports::token_blacklist::TokenBlacklist;

pub struct Logout<'a, B: TokenBlacklist + ?Sized> {
    pub blacklist: &'a B,
}

impl<'a, B: TokenBlacklist + ?Sized> Logout<'a, B> {
    pub async fn execute(&self, token: &str) -> anyhow::Result<()> {
        self.blacklist.blacklist(token).await
    }
}
