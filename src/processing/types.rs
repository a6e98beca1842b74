//! Core data types and error definitions for ingestion and queries.

use crate::{blob::BlobError, geo::GeoPoint, scoring::ScoringError, store::StoreError};
use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of media attached to a post, derived from the uploaded file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// jpeg, jpg, gif, png.
    Image,
    /// mov, mp4, avi, flv, wmv.
    Video,
    /// No media was supplied.
    #[default]
    #[serde(rename = "")]
    Absent,
    /// Media was supplied but its extension is not recognized.
    #[serde(other)]
    Unknown,
}

/// A stored post. Serialized field names match the post collection mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Minted id; also the document id and the blob object name.
    #[serde(default)]
    pub id: String,
    /// Verified identity of the author.
    #[serde(rename = "user")]
    pub owner: String,
    /// Free-form message.
    #[serde(rename = "message", default)]
    pub text: String,
    /// Where the post was made.
    pub location: GeoPoint,
    /// Public URL of the stored media, empty without media.
    #[serde(rename = "url", default)]
    pub media_locator: String,
    /// Media classification, empty without media.
    #[serde(rename = "type", default)]
    pub media_kind: MediaKind,
    /// Face-detection confidence for images, `0.0` otherwise.
    #[serde(rename = "face", default)]
    pub quality_score: f32,
}

/// Uploaded media part.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Client-supplied file name; only its extension is used.
    pub file_name: String,
    /// Raw media bytes.
    pub bytes: Bytes,
}

/// Input to [`crate::processing::PostService::ingest`].
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Identity taken from the verified bearer token.
    pub owner: String,
    /// Message text; may be empty.
    pub text: String,
    /// Post location; required.
    pub location: Option<GeoPoint>,
    /// Optional media part.
    pub media: Option<MediaUpload>,
}

/// Radius search around a point.
#[derive(Debug, Clone, Copy)]
pub struct RadiusQuery {
    /// Search center.
    pub center: GeoPoint,
    /// Radius in kilometers; the service default applies when `None`.
    pub radius_km: Option<f64>,
}

/// Fields that may be used in a threshold query, keyed by the public term.
const THRESHOLD_FIELDS: [(&str, &str); 2] = [("face", "face"), ("qualityScore", "face")];

/// Threshold search on an allow-listed numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdQuery {
    field: &'static str,
}

impl ThresholdQuery {
    /// Resolve a caller-supplied term against the allow-list.
    pub fn for_term(term: &str) -> Result<Self, ValidationError> {
        let term = term.trim();
        THRESHOLD_FIELDS
            .iter()
            .find(|(public, _)| *public == term)
            .map(|(_, stored)| Self { field: *stored })
            .ok_or_else(|| ValidationError::UnsupportedThresholdField(term.to_string()))
    }

    /// Stored field the threshold applies to.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

/// Malformed or missing client input. Nothing has been written when this is returned.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// No authenticated owner was attached to the request.
    #[error("owner identity is required")]
    MissingOwner,
    /// The request carried no location.
    #[error("location is required")]
    MissingLocation,
    /// A coordinate parameter was absent.
    #[error("missing coordinate '{0}'")]
    MissingCoordinate(&'static str),
    /// A coordinate parameter was not a number.
    #[error("coordinate '{field}' is not a number: {value:?}")]
    InvalidCoordinate {
        /// Parameter name (`lat` or `lon`).
        field: &'static str,
        /// Raw value received.
        value: String,
    },
    /// Latitude outside [-90, 90] or not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude outside [-180, 180] or not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// Search range was not a positive number of kilometers.
    #[error("range must be a positive number of kilometers, got {0:?}")]
    InvalidRange(String),
    /// Threshold term is not an allow-listed numeric field.
    #[error("unsupported threshold field {0:?}")]
    UnsupportedThresholdField(String),
    /// The upload carried no media part.
    #[error("Image is not available")]
    MissingMedia,
    /// Username empty or containing characters outside [a-z0-9].
    #[error("Invalid username or password")]
    InvalidUsername,
    /// Password empty.
    #[error("Invalid username or password")]
    MissingPassword,
    /// Request body could not be decoded.
    #[error("Cannot decode request body: {0}")]
    MalformedBody(String),
}

/// Errors emitted by the ingestion pipeline, one variant per failing step.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input rejected before any external write.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Media could not be written to the blob store.
    #[error("Failed to save media for post {id}: {source}")]
    BlobWrite {
        /// Minted id of the aborted post.
        id: String,
        /// Underlying blob store failure.
        #[source]
        source: BlobError,
    },
    /// Quality scoring failed; the blob written under `id` is orphaned.
    #[error("Failed to score media for post {id}: {source}")]
    Scoring {
        /// Minted id of the aborted post and its orphaned blob.
        id: String,
        /// Underlying scoring failure.
        #[source]
        source: ScoringError,
    },
    /// The record could not be persisted.
    #[error("Failed to save post {id}: {source}")]
    Persist {
        /// Minted id of the aborted post.
        id: String,
        /// Whether a blob was already written under `id`.
        orphaned_blob: bool,
        /// Underlying record store failure.
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    /// Object name of a blob left behind by this failure, if any.
    pub fn orphaned_blob(&self) -> Option<&str> {
        match self {
            Self::Scoring { id, .. } => Some(id),
            Self::Persist {
                id,
                orphaned_blob: true,
                ..
            } => Some(id),
            _ => None,
        }
    }
}

/// Errors emitted while answering radius and threshold queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Query parameters were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The record store request failed.
    #[error("Failed to read posts: {0}")]
    Store(#[from] StoreError),
}
