//! In-memory blob store.

use std::collections::HashMap;

use async_trait::async_trait;
use orderbridge_shared::{PipelineError, Result};
use tokio::sync::RwLock;
use tracing::debug;

use super::{BlobStore, display_key};

/// Blob store backed by a map of `(bucket, key)` to bytes.
///
/// Safe to share across tasks behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored in `bucket`, sorted.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let blobs = self.blobs.read().await;
        let mut keys: Vec<String> = blobs
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Total number of blobs across all buckets.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let blobs = self.blobs.read().await;
        blobs
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| PipelineError::not_found(display_key(bucket, key)))
    }

    async fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        blobs.insert((bucket.to_string(), key.to_string()), body.to_vec());
        debug!(bucket, key, size = body.len(), "stored blob in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_and_get() {
        let store = MemoryBlobStore::new();
        store.put("bucket", "a.json", b"[1,2]").await.unwrap();
        assert_eq!(store.get("bucket", "a.json").await.unwrap(), b"[1,2]");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.get("bucket", "nope.json").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
        assert!(err.to_string().contains("bucket/nope.json"));
    }

    #[tokio::test]
    async fn buckets_are_isolated() {
        let store = MemoryBlobStore::new();
        store.put("one", "k", b"1").await.unwrap();
        assert!(store.get("two", "k").await.is_err());
        assert_eq!(store.keys("one").await, vec!["k".to_string()]);
        assert!(store.keys("two").await.is_empty());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryBlobStore::new();
        store.put("b", "k", b"first").await.unwrap();
        store.put("b", "k", b"second").await.unwrap();
        assert_eq!(store.get("b", "k").await.unwrap(), b"second");
        assert_eq!(store.len().await, 1);
    }
}
