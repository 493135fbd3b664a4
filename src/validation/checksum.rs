//! Checksum verification for stored objects.

use crate::error::{ManifestVerifyError, Result};
use crate::storage::{ObjectLocation, ObjectStore, ObjectStream};
use futures_util::StreamExt;
use md5::{Digest, Md5};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Bytes fed to the hasher per update (1 MiB).
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Outcome of verifying one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// Object content hashes to the manifest value.
    Matched { digest: String },
    /// Object was read but its hash differs.
    Mismatched { expected: String, actual: String },
    /// Verification could not run (bad URI, missing object, read error, timeout).
    Unverifiable { reason: String },
}

impl VerifyOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, VerifyOutcome::Matched { .. })
    }

    pub fn is_unverifiable(&self) -> bool {
        matches!(self, VerifyOutcome::Unverifiable { .. })
    }
}

/// MD5 digest of a whole object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDigest {
    /// Lowercase hex
    pub md5: String,
    pub bytes: u64,
}

/// Hash a byte stream, feeding the hasher in fixed `chunk_size` blocks.
///
/// The digest depends only on the content, not on how the stream is split.
pub async fn md5_stream(mut stream: ObjectStream, chunk_size: usize) -> Result<ObjectDigest> {
    let chunk_size = chunk_size.max(1);
    let mut hasher = Md5::new();
    let mut buffer: Vec<u8> = Vec::with_capacity(chunk_size);
    let mut total: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        total += chunk.len() as u64;

        let mut data = &chunk[..];
        while !data.is_empty() {
            let take = (chunk_size - buffer.len()).min(data.len());
            buffer.extend_from_slice(&data[..take]);
            data = &data[take..];

            if buffer.len() == chunk_size {
                hasher.update(&buffer);
                buffer.clear();
            }
        }
    }

    if !buffer.is_empty() {
        hasher.update(&buffer);
    }

    Ok(ObjectDigest {
        md5: format!("{:x}", hasher.finalize()),
        bytes: total,
    })
}

/// MD5 of an in-memory buffer in a single pass.
pub fn md5_hex(content: &[u8]) -> String {
    format!("{:x}", Md5::digest(content))
}

/// Compare a manifest checksum with a computed digest.
pub fn checksums_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual)
}

/// Verifies objects in a store against expected MD5 values.
pub struct ChecksumVerifier {
    store: Arc<dyn ObjectStore>,
    chunk_size: usize,
    timeout: Option<Duration>,
}

impl ChecksumVerifier {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            chunk_size: CHUNK_SIZE,
            timeout: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Limit how long a single object may take to fetch and hash.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Verify the object at `uri` against `expected`.
    ///
    /// Returns the outcome together with the number of bytes hashed.
    pub async fn verify(&self, uri: &str, expected: &str) -> (VerifyOutcome, u64) {
        match self.compute(uri).await {
            Ok(digest) => {
                let outcome = if checksums_match(expected, &digest.md5) {
                    VerifyOutcome::Matched {
                        digest: digest.md5,
                    }
                } else {
                    tracing::debug!(
                        "Checksum mismatch for {}: expected {}, got {}",
                        uri,
                        expected,
                        digest.md5
                    );
                    VerifyOutcome::Mismatched {
                        expected: expected.trim().to_string(),
                        actual: digest.md5,
                    }
                };
                (outcome, digest.bytes)
            }
            Err(e) => {
                tracing::warn!("Could not hash {}: {}", uri, e);
                (
                    VerifyOutcome::Unverifiable {
                        reason: e.to_string(),
                    },
                    0,
                )
            }
        }
    }

    /// Fetch and hash the object at `uri`.
    pub async fn compute(&self, uri: &str) -> Result<ObjectDigest> {
        let location = ObjectLocation::parse_uri(uri)?;
        let work = async {
            let stream = self
                .store
                .get_object(&location.bucket, &location.key)
                .await?;
            md5_stream(stream, self.chunk_size).await
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| ManifestVerifyError::Timeout(limit))?,
            None => work.await,
        }
    }
}
