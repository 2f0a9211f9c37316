//! Filesystem-based blob storage.
//!
//! Stores blobs as files in a directory structure:
//! ```text
//! {root}/
//!   {bucket}/
//!     {key}
//! ```
//!
//! Keys may contain `/` to create nested directories, mirroring object-store
//! prefixes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use orderbridge_shared::{PipelineError, Result};
use tokio::fs;
use tracing::debug;

use super::{BlobStore, display_key};

/// Filesystem-based blob store rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    ///
    /// Creates the root directory if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| PipelineError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Resolve `(bucket, key)` to a file path, rejecting anything that would
    /// escape the bucket directory.
    fn path_for(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(PipelineError::Storage(format!(
                "invalid bucket name '{bucket}'"
            )));
        }

        let key_path = Path::new(key);
        let is_plain = !key.is_empty()
            && key_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(PipelineError::Storage(format!("invalid object key '{key}'")));
        }

        Ok(self.root.join(bucket).join(key_path))
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(bucket, key)?;

        match fs::read(&path).await {
            Ok(body) => {
                debug!(bucket, key, size = body.len(), "read blob");
                Ok(body)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::not_found(display_key(bucket, key)))
            }
            Err(e) => Err(PipelineError::io(&path, e)),
        }
    }

    async fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        let path = self.path_for(bucket, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::io(parent, e))?;
        }

        // Write atomically using temp file + rename
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        fs::write(&temp_path, body)
            .await
            .map_err(|e| PipelineError::io(&temp_path, e))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;

        debug!(bucket, key, size = body.len(), "stored blob");
        Ok(())
    }
}
