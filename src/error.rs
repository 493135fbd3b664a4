use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestVerifyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid object URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Storage error for s3://{bucket}/{key}: {message}")]
    Storage {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to read manifest {location}")]
    ManifestFetch {
        location: String,
        #[source]
        source: Box<ManifestVerifyError>,
    },

    #[error("Manifest is not valid UTF-8: {0}")]
    ManifestDecode(String),

    #[error("Column '{0}' not found in manifest header")]
    ColumnNotFound(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ManifestVerifyError {
    /// Storage-level error for a bucket/key pair.
    pub fn storage(bucket: &str, key: &str, message: impl Into<String>) -> Self {
        Self::Storage {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(bucket: &str, key: &str) -> Self {
        Self::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ManifestVerifyError>;
