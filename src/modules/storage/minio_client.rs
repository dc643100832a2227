//! MinIO/S3-compatible object store
//!
//! Uploaded objects are kept under a single upload prefix and addressed by
//! their public URL. Downloads go through presigned URLs so the bucket itself
//! can stay private.

use async_trait::async_trait;
use reqwest::Client;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStore;

pub struct MinIOClient {
    bucket: Box<Bucket>,
    /// Same bucket addressed through the public endpoint, used for presigning
    presign_bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    upload_prefix: String,
    presigned_url_expiry_secs: u32,
    /// Fallback client for URLs outside this bucket
    http_client: Client,
}

impl MinIOClient {
    /// Create a new MinIO client and make sure its bucket exists
    pub async fn new(config: MinIOConfig) -> Result<Self> {
        let client = Self::build(&config)?;
        client.ensure_bucket_exists().await?;

        info!(
            "MinIO client initialized for endpoint: {}, public endpoint: {}, bucket: {}, upload_prefix: {}",
            client.endpoint,
            client.public_endpoint,
            client.bucket.name(),
            client.upload_prefix
        );

        Ok(client)
    }

    fn build(config: &MinIOConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        };
        let bucket = path_style_bucket(&config.bucket, region.clone(), credentials.clone())?;

        // Presigned URLs are signed for the host the client will actually reach
        let public_region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
        };
        let presign_bucket = path_style_bucket(&config.bucket, public_region, credentials.clone())?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            bucket,
            presign_bucket,
            region,
            credentials,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
            upload_prefix: config.upload_prefix.trim_matches('/').to_string(),
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
            http_client,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<()> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<()> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }

    /// Public URL for an object key
    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    /// Extract the object key from a URL pointing into this bucket
    ///
    /// Accepts both the public and the internal endpoint. Returns `None` for
    /// URLs that belong to another host or bucket.
    pub fn extract_key_from_url(&self, url: &str) -> Option<String> {
        let bucket = self.bucket.name();
        [&self.public_endpoint, &self.endpoint]
            .iter()
            .map(|endpoint| format!("{}/{}/", endpoint, bucket))
            .find_map(|prefix| url.strip_prefix(prefix.as_str()).map(str::to_string))
            .filter(|key| !key.is_empty())
    }

    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to upload file '{}': HTTP {}",
                key, status
            )));
        }

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let response = self.bucket.get_object(key).await.map_err(|e| {
            AppError::Storage(format!("Failed to download file '{}': {}", key, e))
        })?;

        let status = response.status_code();
        if status == 404 {
            return Err(AppError::NotFound(format!("Object '{}' not found", key)));
        }
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to download file '{}': HTTP {}",
                key, status
            )));
        }

        Ok(response.to_vec())
    }

    /// Plain HTTP fetch for URLs this bucket does not own
    async fn fetch_external(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to fetch '{}': {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "Failed to fetch '{}': HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read '{}': {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

/// Path-style bucket handle (http://endpoint/bucket instead of http://bucket.endpoint)
fn path_style_bucket(name: &str, region: Region, credentials: Credentials) -> Result<Box<Bucket>> {
    let mut bucket = Bucket::new(name, region, credentials)
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO bucket: {}", e)))?;
    bucket.set_path_style();
    Ok(bucket)
}

#[async_trait]
impl ObjectStore for MinIOClient {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.upload(key, &data, content_type).await?;
        Ok(self.get_file_url(key))
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        match self.extract_key_from_url(url) {
            Some(key) => self.download(&key).await,
            None => self.fetch_external(url).await,
        }
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let key = self.extract_key_from_url(url).ok_or_else(|| {
            AppError::Storage(format!("'{}' is not an object of this bucket", url))
        })?;

        self.bucket
            .delete_object(&key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!("Deleted file '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn access_url(&self, url: &str) -> Result<String> {
        let Some(key) = self.extract_key_from_url(url) else {
            return Ok(url.to_string());
        };

        self.presign_bucket
            .presign_get(&key, self.presigned_url_expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })
    }

    fn upload_prefix(&self) -> &str {
        &self.upload_prefix
    }
}
