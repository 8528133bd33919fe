use anyhow::{Context, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use crate::application::ports::object_bucket::{ObjectBucket, SaveOptions};
use crate::bootstrap::config::Config;

/// S3-compatible bucket (AWS, GCS interoperability endpoint, MinIO).
pub struct S3Bucket {
    client: Client,
    bucket: String,
    public_host: String,
}

impl S3Bucket {
    pub async fn new(cfg: &Config) -> anyhow::Result<Self> {
        let bucket = cfg
            .s3_bucket
            .clone()
            .context("S3 bucket must be configured for remote image storage")?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &cfg.s3_region {
            loader = loader.region(Region::new(region.clone()));
        }

        let shared_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);

        if let (Some(access), Some(secret)) = (&cfg.s3_access_key, &cfg.s3_secret_key) {
            let creds = Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                "profile-api-s3-static",
            );
            builder = builder.credentials_provider(creds);
        }

        if let Some(endpoint) = &cfg.s3_endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        if cfg.s3_use_path_style {
            builder = builder.force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        Ok(Self {
            client,
            bucket,
            public_host: cfg.s3_public_host.clone(),
        })
    }
}

#[async_trait]
impl ObjectBucket for S3Bucket {
    fn name(&self) -> &str {
        &self.bucket
    }

    fn public_host(&self) -> &str {
        &self.public_host
    }

    async fn save(&self, path: &str, bytes: &[u8], opts: SaveOptions<'_>) -> anyhow::Result<()> {
        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(opts.content_type)
            .body(ByteStream::from(bytes.to_vec()));
        for (k, v) in opts.metadata {
            req = req.metadata(k, v);
        }
        if opts.public {
            req = req.acl(ObjectCannedAcl::PublicRead);
        }
        req.send()
            .await
            .with_context(|| format!("failed to upload object {path}"))?;
        Ok(())
    }

    async fn make_public(&self, path: &str) -> anyhow::Result<()> {
        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(path)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .with_context(|| format!("failed to make {path} public"))?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .with_context(|| format!("failed to delete object {path}"))?;
        Ok(())
    }

    async fn probe(&self) -> anyhow::Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|err| anyhow!("head_bucket failed for {}: {}", self.bucket, err))?;
        Ok(())
    }
}
