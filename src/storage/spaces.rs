//! DigitalOcean Spaces publish target (S3-compatible).
//!
//! Uploads the catalog JSON and card images under an optional key prefix and
//! serves them publicly through the bucket's virtual-host URL. All objects are
//! written with a `public-read` ACL.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::env;
use url::Url;

use super::{download_image, image_relative_path, CatalogStore, CATALOG_FILE, IMG_SUBPATH};
use crate::catalog::CardRecord;
use crate::error::{Result, SyncError};

const REQUIRED_ENV_VARS: [&str; 4] = [
    "SPACES_ENDPOINT",
    "SPACES_KEY",
    "SPACES_SECRET",
    "SPACES_BUCKET",
];

const CATALOG_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Validated Spaces connection settings, environment-sourced at startup.
#[derive(Debug, Clone)]
pub struct SpacesConfig {
    pub endpoint: Url,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Key prefix with surrounding slashes stripped; may be empty.
    pub prefix: String,
    public_base_url: String,
}

impl SpacesConfig {
    /// Reads and validates the `SPACES_*` environment variables. Partial
    /// configuration is a startup failure listing every missing variable.
    pub fn from_env() -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_ENV_VARS
            .iter()
            .copied()
            .filter(|name| env::var(name).map_or(true, |value| value.trim().is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(SyncError::Config(format!(
                "missing required Spaces env vars: {}",
                missing.join(", ")
            )));
        }

        Self::from_parts(
            &env::var("SPACES_ENDPOINT").unwrap_or_default(),
            &env::var("SPACES_KEY").unwrap_or_default(),
            &env::var("SPACES_SECRET").unwrap_or_default(),
            &env::var("SPACES_BUCKET").unwrap_or_default(),
            &env::var("SPACES_PREFIX").unwrap_or_default(),
        )
    }

    /// Validates raw settings and precomputes the public base URL.
    pub fn from_parts(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        prefix: &str,
    ) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(SyncError::Config("SPACES_ENDPOINT cannot be empty".into()));
        }

        let normalized = if endpoint.to_lowercase().starts_with("http") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };
        let endpoint = Url::parse(&normalized)
            .map_err(|e| SyncError::Config(format!("invalid SPACES_ENDPOINT {normalized}: {e}")))?;
        let host = endpoint
            .host_str()
            .ok_or_else(|| SyncError::Config(format!("invalid SPACES_ENDPOINT {normalized}")))?;

        let bucket = bucket.trim().to_string();
        if bucket.is_empty() {
            return Err(SyncError::Config("SPACES_BUCKET cannot be empty".into()));
        }

        let mut public_base_url = format!("{}://{}.{}", endpoint.scheme(), bucket, host);
        if let Some(port) = endpoint.port() {
            public_base_url.push_str(&format!(":{port}"));
        }
        let path = endpoint.path().trim_end_matches('/');
        if !path.is_empty() {
            public_base_url.push_str(path);
        }

        Ok(Self {
            access_key: access_key.trim().to_string(),
            secret_key: secret_key.trim().to_string(),
            bucket,
            prefix: prefix.trim().trim_matches('/').to_string(),
            public_base_url,
            endpoint,
        })
    }

    fn prefixed_key(&self, relative_path: &str) -> String {
        let clean_path = relative_path.trim_start_matches('/');
        if self.prefix.is_empty() {
            clean_path.to_string()
        } else {
            format!("{}/{}", self.prefix, clean_path)
        }
    }

    /// Public URL of an object under the configured prefix.
    pub fn public_url(&self, relative_path: &str) -> String {
        format!("{}/{}", self.public_base_url, self.prefixed_key(relative_path))
    }
}

/// Publishes the catalog and images to a Spaces bucket.
pub struct SpacesStore {
    client: aws_sdk_s3::Client,
    http: reqwest::Client,
    config: SpacesConfig,
}

impl SpacesStore {
    pub fn new(config: SpacesConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "spaces-env",
        );
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(config.endpoint.as_str())
            .credentials_provider(credentials)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn object_exists(&self, key: &str) -> bool {
        match self
            .client
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => true,
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|service_err| service_err.is_not_found())
                    .unwrap_or(false);
                if !not_found {
                    // Treated as absent: the subsequent upload either heals the
                    // object or degrades per variant.
                    log::warn!(
                        "Existence check failed for {}: {}",
                        key,
                        DisplayErrorContext(&err)
                    );
                }
                false
            }
        }
    }

    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| SyncError::Storage(format!("{}", DisplayErrorContext(&err))))?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SpacesStore {
    async fn publish_image(
        &self,
        source_url: &str,
        set_folder: &str,
        variant_code: &str,
    ) -> (String, bool) {
        if source_url.is_empty() {
            return (String::new(), false);
        }

        let relative = format!(
            "{IMG_SUBPATH}/{}",
            image_relative_path(set_folder, variant_code)
        );
        let key = self.config.prefixed_key(&relative);

        // Existence check before any download keeps reruns cheap.
        if self.object_exists(&key).await {
            return (self.config.public_url(&relative), false);
        }

        let (bytes, content_type) = match download_image(&self.http, source_url).await {
            Ok(downloaded) => downloaded,
            Err(e) => {
                log::warn!(
                    "Failed to download image for variant {}: {}",
                    variant_code,
                    e
                );
                return (source_url.to_string(), false);
            }
        };

        if let Err(e) = self.put_object(&key, bytes, &content_type).await {
            log::warn!(
                "Failed to upload image for variant {}: {}",
                variant_code,
                e
            );
            return (source_url.to_string(), false);
        }

        (self.config.public_url(&relative), true)
    }

    async fn write_catalog(&self, cards: &[CardRecord]) -> Result<String> {
        let json = serde_json::to_string(cards)?;
        let key = self.config.prefixed_key(CATALOG_FILE);
        self.put_object(&key, json.into_bytes(), CATALOG_CONTENT_TYPE)
            .await?;
        Ok(self.config.public_url(CATALOG_FILE))
    }

    async fn load_previous(&self) -> Option<Vec<CardRecord>> {
        let key = self.config.prefixed_key(CATALOG_FILE);
        let response = match self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|service_err| service_err.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    log::info!("No previous catalog at {}", key);
                } else {
                    log::warn!(
                        "Failed to load previous catalog {}: {}",
                        key,
                        DisplayErrorContext(&err)
                    );
                }
                return None;
            }
        };

        let bytes = match response.body.collect().await {
            Ok(data) => data.into_bytes(),
            Err(e) => {
                log::warn!("Failed to read previous catalog {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(cards) => Some(cards),
            Err(e) => {
                log::warn!("Failed to parse previous catalog {}: {}", key, e);
                None
            }
        }
    }
}
