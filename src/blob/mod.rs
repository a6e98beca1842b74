//! Blob storage for uploaded media.
//!
//! Objects are written publicly readable at upload time so that the returned locator can be
//! handed straight to clients and to the quality scorer.

use crate::config::get_config;
use crate::transport::{build_client, failure_body, format_endpoint, normalize_base_url};
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while writing media objects.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid blob store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response (includes timeouts).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The object store rejected the upload.
    #[error("Unexpected blob store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the object store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Upload succeeded but no public locator came back.
    #[error("Blob store returned no media link for object {0}")]
    MissingLocator(String),
}

/// Durable object storage with public-read objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `object_name` and return a publicly resolvable locator.
    async fn write(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, BlobError>;
}

/// Object storage client speaking the GCS JSON upload API.
pub struct GcsBlobStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) bucket: String,
    pub(crate) access_token: Option<String>,
}

#[derive(Deserialize)]
struct ObjectResource {
    #[serde(rename = "mediaLink", default)]
    media_link: Option<String>,
}

impl GcsBlobStore {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, BlobError> {
        let config = get_config();
        let client = build_client(Duration::from_secs(config.adapter_timeout_secs))?;
        let base_url = normalize_base_url(&config.gcs_base_url).map_err(BlobError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            bucket = %config.gcs_bucket,
            has_token = config.gcs_access_token.is_some(),
            "Initialized blob store client"
        );

        Ok(Self {
            client,
            base_url,
            bucket: config.gcs_bucket.clone(),
            access_token: config.gcs_access_token.clone(),
        })
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn write(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, BlobError> {
        let size = bytes.len();
        let url = format_endpoint(
            &self.base_url,
            &format!("upload/storage/v1/b/{}/o", self.bucket),
        );
        let mut request = self
            .client
            .post(url)
            .query(&[
                ("uploadType", "media"),
                ("name", object_name),
                ("predefinedAcl", "publicRead"),
            ])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let (status, body) = failure_body(response).await;
            let error = BlobError::UnexpectedStatus { status, body };
            tracing::error!(object = object_name, error = %error, "Blob upload failed");
            return Err(error);
        }

        let resource: ObjectResource = response.json().await?;
        let locator = resource
            .media_link
            .filter(|link| !link.is_empty())
            .ok_or_else(|| BlobError::MissingLocator(object_name.to_string()))?;
        tracing::info!(object = object_name, size, locator = %locator, "Media saved");
        Ok(locator)
    }
}

/// MIME type sent with an upload, derived from the file extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = crate::processing::media::extension_of(file_name);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("flv") => "video/x-flv",
        Some("wmv") => "video/x-ms-wmv",
        _ => "application/octet-stream",
    }
}
