//! Media quality scoring backed by a face-detection API.

use crate::config::get_config;
use crate::transport::{build_client, failure_body, format_endpoint, normalize_base_url};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by quality scoring backends.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid scoring service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response (includes timeouts).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The scoring service answered with a non-success status.
    #[error("Unexpected scoring response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the scoring service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The service accepted the request but reported a per-image failure.
    #[error("Scoring service rejected the image: {0}")]
    Rejected(String),
}

/// Interface implemented by quality scoring backends.
#[async_trait]
pub trait QualityScorer: Send + Sync {
    /// Return a confidence in `[0, 1]`; `0.0` means no subject was detected.
    async fn score(&self, locator: &str) -> Result<f32, ScoringError>;
}

/// Face-detection scorer using the image annotation REST API.
pub struct VisionFaceScorer {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotation>,
}

#[derive(Deserialize)]
struct ImageAnnotation {
    #[serde(rename = "faceAnnotations", default)]
    face_annotations: Vec<FaceAnnotation>,
    #[serde(default)]
    error: Option<AnnotationStatus>,
}

#[derive(Deserialize)]
struct FaceAnnotation {
    #[serde(rename = "detectionConfidence", default)]
    detection_confidence: f32,
}

#[derive(Deserialize)]
struct AnnotationStatus {
    #[serde(default)]
    message: String,
}

impl VisionFaceScorer {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, ScoringError> {
        let config = get_config();
        let client = build_client(Duration::from_secs(config.adapter_timeout_secs))?;
        let base_url = normalize_base_url(&config.vision_url).map_err(ScoringError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized face scoring client");

        Ok(Self {
            client,
            base_url,
            api_key: config.vision_api_key.clone(),
        })
    }
}

#[async_trait]
impl QualityScorer for VisionFaceScorer {
    async fn score(&self, locator: &str) -> Result<f32, ScoringError> {
        let body = json!({
            "requests": [{
                "image": { "source": { "imageUri": locator } },
                "features": [{ "type": "FACE_DETECTION", "maxResults": 1 }]
            }]
        });

        let mut request = self
            .client
            .post(format_endpoint(&self.base_url, "v1/images:annotate"))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let (status, body) = failure_body(response).await;
            let error = ScoringError::UnexpectedStatus { status, body };
            tracing::error!(locator, error = %error, "Face detection request failed");
            return Err(error);
        }

        let payload: AnnotateResponse = response.json().await?;
        let Some(annotation) = payload.responses.into_iter().next() else {
            tracing::info!(locator, "No faces found");
            return Ok(0.0);
        };
        if let Some(status) = annotation.error {
            return Err(ScoringError::Rejected(status.message));
        }

        match annotation.face_annotations.first() {
            Some(face) => Ok(face.detection_confidence.clamp(0.0, 1.0)),
            None => {
                tracing::info!(locator, "No faces found");
                Ok(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn scorer_for(server: &MockServer) -> VisionFaceScorer {
        VisionFaceScorer {
            client: Client::new(),
            base_url: server.base_url(),
            api_key: Some("vision-key".into()),
        }
    }

    #[tokio::test]
    async fn returns_first_face_confidence() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/images:annotate")
                    .query_param("key", "vision-key")
                    .json_body(json!({
                        "requests": [{
                            "image": { "source": { "imageUri": "https://media/a" } },
                            "features": [{ "type": "FACE_DETECTION", "maxResults": 1 }]
                        }]
                    }));
                then.status(200).json_body(json!({
                    "responses": [{
                        "faceAnnotations": [{ "detectionConfidence": 0.95 }]
                    }]
                }));
            })
            .await;

        let score = scorer_for(&server).score("https://media/a").await.expect("score");
        mock.assert();
        assert!((score - 0.95).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn no_face_is_zero_not_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(200).json_body(json!({ "responses": [{}] }));
            })
            .await;

        let score = scorer_for(&server).score("https://media/b").await.expect("score");
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn per_image_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(200).json_body(json!({
                    "responses": [{ "error": { "code": 7, "message": "image not readable" } }]
                }));
            })
            .await;

        let err = scorer_for(&server)
            .score("https://media/c")
            .await
            .expect_err("rejected");
        assert!(matches!(err, ScoringError::Rejected(message) if message == "image not readable"));
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(500).body("boom");
            })
            .await;

        assert!(matches!(
            scorer_for(&server).score("https://media/d").await,
            Err(ScoringError::UnexpectedStatus { .. })
        ));
    }
}
