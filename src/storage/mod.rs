//! Object store access.
//!
//! All backends expose the same `get_object(bucket, key)` operation returning a
//! stream of byte chunks. The client is built once per run and shared by the
//! manifest loader and every verification worker.

pub mod http;
pub mod location;
pub mod memory;
pub mod s3;

use crate::config::schema::{Backend, StorageConfig};
use crate::error::{ManifestVerifyError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;

pub use http::HttpStore;
pub use location::ObjectLocation;
pub use memory::InMemoryStore;
pub use s3::S3Store;

/// Streaming body of a single object.
pub type ObjectStream = BoxStream<'static, Result<Bytes>>;

/// Read-only access to a bucket/key addressed object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name used in log output.
    fn name(&self) -> &'static str;

    /// Open a streaming read of `key` in `bucket`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream>;

    /// Read a whole object into memory.
    async fn get_object_bytes(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let mut stream = self.get_object(bucket, key).await?;
        let mut content = Vec::new();
        while let Some(chunk) = stream.next().await {
            content.extend_from_slice(&chunk?);
        }
        Ok(content)
    }
}

/// Build the configured store client.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        Backend::S3 => Arc::new(S3Store::from_config(config).await?),
        Backend::Http => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                ManifestVerifyError::Config("the http backend requires an endpoint".into())
            })?;
            Arc::new(HttpStore::new(endpoint)?)
        }
    };
    tracing::debug!("Using {} object store", store.name());
    Ok(store)
}
