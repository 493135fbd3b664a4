//! Configuration schema for manifest-verify.
//!
//! ```toml
//! [storage]
//! backend = "s3"          # or "http"
//! region = "us-east-1"
//! # endpoint = "http://localhost:9000"
//! # force_path_style = true
//!
//! [manifest]
//! checksum_column = 1     # index, or a header name such as "md5"
//! uri_column = 4
//! has_header = false
//! delimiter = "\t"
//!
//! [verify]
//! workers = 8
//! timeout = "10m"
//! chunk_size = 1048576
//! ```

use crate::dispatch::DEFAULT_WORKERS;
use crate::error::{ManifestVerifyError, Result};
use crate::manifest::ManifestFormat;
use crate::validation::CHUNK_SIZE;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub manifest: ManifestFormat,
    pub verify: VerifyConfig,
}

/// Object store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// AWS S3 with the default credential chain
    #[default]
    S3,
    /// Anonymous path-style HTTP GETs against an endpoint
    Http,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::S3 => write!(f, "s3"),
            Backend::Http => write!(f, "http"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(Backend::S3),
            "http" | "https" => Ok(Backend::Http),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Region override (S3 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint (required for http, optional for S3-compatible stores)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Address buckets as `{endpoint}/{bucket}` instead of virtual hosts
    pub force_path_style: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Number of concurrent verifications
    pub workers: usize,
    /// Per-object time limit, e.g. "30s" or "10m"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    /// Bytes per hash update
    pub chunk_size: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: None,
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl VerifyConfig {
    /// Parsed per-object timeout, if one is set.
    pub fn timeout_duration(&self) -> Result<Option<Duration>> {
        self.timeout.as_deref().map(parse_timeout).transpose()
    }
}

/// Parse a duration string such as "90s", "10m" or "1h 30m".
pub fn parse_timeout(s: &str) -> Result<Duration> {
    humantime::parse_duration(s.trim())
        .map_err(|e| ManifestVerifyError::Config(format!("invalid timeout '{}': {}", s, e)))
}
