//! In-memory object store for tests and local dry runs.

use super::{ObjectStore, ObjectStream};
use crate::error::{ManifestVerifyError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Objects keyed by (bucket, key), served as a stream of fixed-size chunks.
pub struct InMemoryStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
    /// Denied keys return a storage error instead of content.
    denied: RwLock<HashMap<(String, String), String>>,
    /// Size of the chunks handed out by `get_object`.
    stream_chunk: usize,
    /// Delay before each `get_object` answers.
    latency: Option<Duration>,
    requests: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_stream_chunk(64 * 1024)
    }

    /// Use a specific chunk size for the returned streams.
    pub fn with_stream_chunk(stream_chunk: usize) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            denied: RwLock::new(HashMap::new()),
            stream_chunk: stream_chunk.max(1),
            latency: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Make every read wait `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store an object, replacing any previous content.
    pub fn put(&self, bucket: &str, key: &str, content: impl Into<Bytes>) {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.insert((bucket.to_string(), key.to_string()), content.into());
    }

    /// Make reads of this object fail with `message`.
    pub fn deny(&self, bucket: &str, key: &str, message: &str) {
        let mut denied = self.denied.write().unwrap_or_else(|e| e.into_inner());
        denied.insert((bucket.to_string(), key.to_string()), message.to_string());
    }

    /// Number of `get_object` calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let id = (bucket.to_string(), key.to_string());

        if let Some(message) = self
            .denied
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
        {
            return Err(ManifestVerifyError::storage(bucket, key, message.clone()));
        }

        let content = self
            .objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
            .ok_or_else(|| ManifestVerifyError::not_found(bucket, key))?;

        let chunks: Vec<Result<Bytes>> = (0..content.len())
            .step_by(self.stream_chunk)
            .map(|start| {
                let end = (start + self.stream_chunk).min(content.len());
                Ok(content.slice(start..end))
            })
            .collect();

        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_read() {
        let store = InMemoryStore::with_stream_chunk(3);
        store.put("b", "k", "hello world");

        let content = store.get_object_bytes("b", "k").await.unwrap();
        assert_eq!(content, b"hello world");
        assert_eq!(store.request_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = InMemoryStore::new();
        let err = store.get_object("b", "missing").await.err().unwrap();
        assert!(matches!(err, ManifestVerifyError::ObjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_denied_object() {
        let store = InMemoryStore::new();
        store.put("b", "secret", "data");
        store.deny("b", "secret", "Access Denied");

        let err = store.get_object("b", "secret").await.err().unwrap();
        assert!(err.to_string().contains("Access Denied"));
    }

    #[tokio::test]
    async fn test_empty_object() {
        let store = InMemoryStore::new();
        store.put("b", "empty", Bytes::new());
        let content = store.get_object_bytes("b", "empty").await.unwrap();
        assert!(content.is_empty());
    }
}
