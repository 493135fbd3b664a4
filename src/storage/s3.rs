//! AWS S3 backend using the default credential chain.

use super::{ObjectStore, ObjectStream};
use crate::config::schema::StorageConfig;
use crate::error::{ManifestVerifyError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;

pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Build a client from ambient credentials, applying region/endpoint overrides.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Ok(Self::new(Client::from_conf(builder.build())))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream> {
        tracing::debug!("GetObject s3://{}/{}", bucket, key);

        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    return Err(ManifestVerifyError::not_found(bucket, key));
                }
                return Err(ManifestVerifyError::storage(
                    bucket,
                    key,
                    DisplayErrorContext(&err).to_string(),
                ));
            }
        };

        let bucket = bucket.to_string();
        let key = key.to_string();
        let stream = futures_util::stream::unfold(output.body, move |mut body| {
            let bucket = bucket.clone();
            let key = key.clone();
            async move {
                let chunk = body.next().await?;
                let chunk = chunk.map_err(|e| {
                    ManifestVerifyError::storage(&bucket, &key, format!("read failed: {}", e))
                });
                Some((chunk, body))
            }
        });

        Ok(Box::pin(stream))
    }
}
