//! Key-addressed blob storage for envelopes and CRM documents.
//!
//! The [`BlobStore`] trait is the only storage seam the pipeline stages see.
//! Backends:
//! - [`MemoryBlobStore`]: process-local map, used by tests and embedders
//! - [`FilesystemBlobStore`]: `<root>/<bucket>/<key>` on local disk
//! - `S3BlobStore` (feature: `s3`): Amazon S3 or an S3-compatible service
//!
//! Stores offer plain get/put. There is no locking, versioning, or retry;
//! concurrent writers to the same key race and the last write wins.

mod filesystem;
mod memory;
#[cfg(feature = "s3")]
mod s3;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use orderbridge_shared::{Result, StorageBackend, StorageConfig};

pub use filesystem::FilesystemBlobStore;
pub use memory::MemoryBlobStore;
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;

/// Get/put access to blobs addressed by `(bucket, key)`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob at `(bucket, key)`.
    ///
    /// Fails with [`orderbridge_shared::PipelineError::NotFound`] when nothing is stored there.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write `body` at `(bucket, key)`, replacing any existing blob.
    async fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()>;
}

/// Human-readable `bucket/key` form used in error messages and logs.
pub(crate) fn display_key(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

// ============================================================================
// Factory
// ============================================================================

/// Initialize the blob store selected by configuration.
///
/// # Errors
///
/// Returns a config error if the S3 backend is selected without the `s3`
/// feature, or a storage error if the backend cannot be opened.
pub async fn init_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    use tracing::info;

    match config.backend {
        StorageBackend::Filesystem => {
            info!(root = %config.root, "BlobStore: filesystem");
            let store = FilesystemBlobStore::new(Path::new(&config.root)).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            info!("BlobStore: memory");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            info!(
                endpoint = ?config.s3_endpoint,
                region = ?config.s3_region,
                "BlobStore: s3"
            );
            let store = match &config.s3_endpoint {
                Some(endpoint) => {
                    S3BlobStore::with_endpoint(endpoint, config.s3_region.as_deref()).await
                }
                None => S3BlobStore::new(config.s3_region.as_deref()).await,
            };
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(orderbridge_shared::PipelineError::config(
            "storage backend 's3' requires building with the `s3` feature",
        )),
    }
}
