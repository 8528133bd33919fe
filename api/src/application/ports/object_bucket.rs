use std::collections::HashMap;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SaveOptions<'a> {
    pub content_type: &'a str,
    pub metadata: &'a HashMap<String, String>,
    pub public: bool,
}

/// Handle on a remote bucket, created once at startup and injected where needed.
#[async_trait]
pub trait ObjectBucket: Send + Sync {
    fn name(&self) -> &str;
    /// Host serving public objects, e.g. `storage.googleapis.com`.
    fn public_host(&self) -> &str;
    async fn save(&self, path: &str, bytes: &[u8], opts: SaveOptions<'_>) -> anyhow::Result<()>;
    async fn make_public(&self, path: &str) -> anyhow::Result<()>;
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
    /// Cheap round trip used to decide whether the bucket is usable at all.
    async fn probe(&self) -> anyhow::Result<()>;
}
