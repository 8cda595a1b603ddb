//! S3 client implementation.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// AWS region
    pub region: String,
    /// Bucket name
    pub bucket_name: String,
    /// Custom endpoint for S3-compatible stores
    pub endpoint_url: Option<String>,
    /// Static access key; the default credential chain is used when unset
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            region: std::env::var("AWS_DEFAULT_REGION")
                .map_err(|_| StorageError::config_error("AWS_DEFAULT_REGION not set"))?,
            bucket_name: std::env::var("AWS_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("AWS_BUCKET_NAME not set"))?,
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok(),
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
        })
    }
}

/// Object storage seam used by the pipeline uploader.
///
/// One call is one put; retrying is the caller's job.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket the store writes to.
    fn bucket(&self) -> &str;

    /// Write `data` under `key`, overwriting any existing object.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> StorageResult<()>;
}

/// S3 storage client.
///
/// SDK-level retries are disabled so the pipeline's retry policy is the only
/// retry layer.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        if config.bucket_name.trim().is_empty() {
            return Err(StorageError::config_error("bucket name is empty"));
        }

        let region = Region::new(config.region.clone());

        let s3_config = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let credentials =
                    Credentials::new(access_key_id, secret_access_key, None, None, "psort-env");

                let mut builder = Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials);
                if let Some(endpoint) = &config.endpoint_url {
                    builder = builder.endpoint_url(endpoint).force_path_style(true);
                }
                builder.retry_config(RetryConfig::disabled()).build()
            }
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;

                let mut builder = Builder::from(&shared);
                if let Some(endpoint) = &config.endpoint_url {
                    builder = builder.endpoint_url(endpoint).force_path_style(true);
                }
                builder.retry_config(RetryConfig::disabled()).build()
            }
        };

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket_name,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// Upload bytes to the bucket.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}/{}", data.len(), self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(DisplayErrorContext(&e).to_string()))?;

        info!(bucket = %self.bucket, key = %key, "Uploaded object");
        Ok(())
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::AwsSdk(format!(
                    "S3 connectivity check failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        self.upload_bytes(data, key, content_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: &str) -> S3Config {
        S3Config {
            region: "us-east-1".to_string(),
            bucket_name: "media-bucket".to_string(),
            endpoint_url: Some(endpoint.to_string()),
            access_key_id: Some("AKIDTEST".to_string()),
            secret_access_key: Some("secret".to_string()),
        }
    }

    #[tokio::test]
    async fn test_put_object_uses_label_prefixed_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/media-bucket/cars/1.jpg"))
            .and(header("content-type", "image/jpeg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = S3Client::new(test_config(&server.uri())).await.unwrap();
        assert_eq!(client.bucket(), "media-bucket");

        client
            .put_object("cars/1.jpg", b"jpeg-bytes".to_vec(), "image/jpeg")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_put_object_server_error_is_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = S3Client::new(test_config(&server.uri())).await.unwrap();
        let err = client
            .put_object("misc/2.png", b"png".to_vec(), "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_bucket_rejected() {
        let mut config = test_config("http://127.0.0.1:1");
        config.bucket_name = " ".to_string();

        assert!(matches!(
            S3Client::new(config).await,
            Err(StorageError::ConfigError(_))
        ));
    }
}
