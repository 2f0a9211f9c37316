//! Amazon S3 blob store.
//!
//! Buckets and keys map one-to-one onto S3 buckets and object keys.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use orderbridge_shared::{PipelineError, Result};
use tracing::debug;

use super::{BlobStore, display_key};

/// S3-based blob store.
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    /// Create a new S3 blob store.
    ///
    /// Uses default credentials from the environment (AWS_ACCESS_KEY_ID,
    /// AWS_SECRET_ACCESS_KEY, or IAM role).
    pub async fn new(region: Option<&str>) -> Self {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            config_loader = config_loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = config_loader.load().await;

        Self {
            client: Client::new(&config),
        }
    }

    /// Create with custom endpoint (for S3-compatible services like MinIO).
    pub async fn with_endpoint(endpoint: &str, region: Option<&str>) -> Self {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            config_loader = config_loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = config_loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .endpoint_url(endpoint)
            .force_path_style(true) // Required for MinIO and most S3-compatible services
            .build();

        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("NoSuchKey") || err_str.contains("404") {
                    PipelineError::not_found(display_key(bucket, key))
                } else {
                    PipelineError::Storage(format!("S3 download failed: {e}"))
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| PipelineError::Storage(format!("S3 body read failed: {e}")))?
            .into_bytes()
            .to_vec();

        debug!(bucket, key, size = body.len(), "read blob from S3");
        Ok(body)
    }

    async fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .send()
            .await
            .map_err(|e| PipelineError::Storage(format!("S3 upload failed: {e}")))?;

        debug!(bucket, key, size = body.len(), "stored blob in S3");
        Ok(())
    }
}
