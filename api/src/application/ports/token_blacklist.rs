use async_trait::async_trait;

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    async fn is_blacklisted(&self, token: &str) -> anyhow::Result<bool>;
    /// Idempotent: blacklisting a token twice is not an error.
    async fn blacklist(&self, token: &str) -> anyhow::Result<()>;
}
