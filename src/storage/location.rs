//! Bucket/key addressing and `scheme://bucket/key` URI parsing.

use crate::error::{ManifestVerifyError, Result};
use std::fmt;
use std::str::FromStr;

/// A bucket plus a normalized object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    /// Key without leading or trailing `/`.
    pub key: String,
}

impl ObjectLocation {
    /// Create a location, stripping separators around the key.
    pub fn new(bucket: impl Into<String>, key: &str) -> Result<Self> {
        let bucket = bucket.into();
        let key = normalize_key(key);

        if bucket.is_empty() {
            return Err(ManifestVerifyError::InvalidInput("bucket name is empty".into()));
        }
        if key.is_empty() {
            return Err(ManifestVerifyError::InvalidInput(format!(
                "object key is empty for bucket '{}'",
                bucket
            )));
        }

        Ok(Self { bucket, key })
    }

    /// Parse a `scheme://bucket/path` URI.
    ///
    /// The scheme is not checked. The bucket is everything up to the first
    /// `/` after `://`; the rest is the key exactly as written, minus leading
    /// and trailing `/`. Dot segments and `%XX` escapes are kept.
    pub fn parse_uri(uri: &str) -> Result<Self> {
        let invalid = |reason: &str| ManifestVerifyError::InvalidUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = uri
            .trim()
            .split_once("://")
            .ok_or_else(|| invalid("expected scheme://bucket/key"))?;
        if scheme.is_empty() {
            return Err(invalid("missing scheme"));
        }

        let (bucket, path) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid("missing bucket"));
        }

        let key = normalize_key(path);
        if key.is_empty() {
            return Err(invalid("missing object key"));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key,
        })
    }
}

impl FromStr for ObjectLocation {
    type Err = ManifestVerifyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_uri(s)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim_matches('/').to_string()
}
