//! Anonymous path-style HTTP access (public buckets, S3-compatible gateways).

use super::{ObjectStore, ObjectStream};
use crate::error::{ManifestVerifyError, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use std::time::Duration;
use url::Url;

pub struct HttpStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpStore {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ManifestVerifyError::Config(format!("invalid endpoint '{}': {}", endpoint, e))
        })?;

        if endpoint.cannot_be_a_base() {
            return Err(ManifestVerifyError::Config(format!(
                "endpoint '{}' cannot be used as a base URL",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent("manifest-verify")
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Build `{endpoint}/{bucket}/{key}` with each key segment escaped.
    pub fn object_url(&self, bucket: &str, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(bucket).extend(key.split('/'));
        }
        url
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream> {
        let url = self.object_url(bucket, key);
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ManifestVerifyError::not_found(bucket, key));
        }

        if !response.status().is_success() {
            return Err(ManifestVerifyError::storage(
                bucket,
                key,
                format!("HTTP {} for {}", response.status(), url),
            ));
        }

        let stream = response.bytes_stream().map_err(ManifestVerifyError::from);
        Ok(Box::pin(stream))
    }
}
