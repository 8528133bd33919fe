use async_trait::async_trait;

use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::infrastructure::db::PgPool;

pub struct SqlxTokenBlacklist {
    pub pool: PgPool,
}

impl SqlxTokenBlacklist {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklist for SqlxTokenBlacklist {
    async fn is_blacklisted(&self, token: &str) -> anyhow::Result<bool> {
        let found = sqlx::query_scalar::<_, i32>("SELECT 1 FROM blacklist_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn blacklist(&self, token: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO blacklist_tokens (token) VALUES ($1) ON CONFLICT (token) DO NOTHING")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
