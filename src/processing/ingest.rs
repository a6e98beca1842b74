//! Ingestion pipeline: validate, mint, store media, score, persist.
//!
//! Steps run strictly in order and each one depends on the previous succeeding. A failure after
//! the blob write leaves that blob orphaned; it is reported, never rolled back.

use crate::{
    blob::content_type_for,
    geo::GeoPoint,
    processing::{
        media::classify,
        sanitize::{sanitize_owner, sanitize_score},
        service::PostService,
        types::{ContentRecord, IngestError, IngestRequest, MediaKind, ValidationError},
    },
    store::StoreError,
};
use uuid::Uuid;

impl PostService {
    /// Ingest one post and return it as persisted.
    pub async fn ingest(&self, request: IngestRequest) -> Result<ContentRecord, IngestError> {
        let IngestRequest {
            owner,
            text,
            location,
            media,
        } = request;

        let owner = sanitize_owner(&owner)?;
        let location = location.ok_or(ValidationError::MissingLocation)?;
        let location = GeoPoint::new(location.lat, location.lon)?;

        let id = Uuid::new_v4().to_string();
        tracing::info!(id = %id, owner = %owner, has_media = media.is_some(), "Ingesting post");

        let mut record = ContentRecord {
            id: id.clone(),
            owner,
            text,
            location,
            media_locator: String::new(),
            media_kind: MediaKind::Absent,
            quality_score: 0.0,
        };

        if let Some(upload) = media {
            record.media_kind = classify(&upload.file_name);
            let content_type = content_type_for(&upload.file_name);
            record.media_locator = self
                .blobs
                .write(&id, content_type, upload.bytes)
                .await
                .map_err(|source| {
                    self.abort(IngestError::BlobWrite {
                        id: id.clone(),
                        source,
                    })
                })?;
        }

        let scored = record.media_kind == MediaKind::Image;
        if scored {
            let score = self
                .scorer
                .score(&record.media_locator)
                .await
                .map_err(|source| {
                    self.abort(IngestError::Scoring {
                        id: id.clone(),
                        source,
                    })
                })?;
            record.quality_score = sanitize_score(score);
            tracing::debug!(id = %id, score = record.quality_score, "Media scored");
        }

        let orphaned_blob = !record.media_locator.is_empty();
        let persisted = match serde_json::to_value(&record) {
            Ok(document) => {
                self.records
                    .put(&self.settings.collection, &id, &document)
                    .await
            }
            Err(error) => Err(StoreError::from(error)),
        };
        persisted.map_err(|source| {
            self.abort(IngestError::Persist {
                id: id.clone(),
                orphaned_blob,
                source,
            })
        })?;

        self.metrics.record_post(scored);
        tracing::info!(
            id = %id,
            media_kind = ?record.media_kind,
            score = record.quality_score,
            "Post saved"
        );
        Ok(record)
    }

    fn abort(&self, error: IngestError) -> IngestError {
        let orphan = error.orphaned_blob();
        self.metrics.record_failure(orphan.is_some());
        match orphan {
            Some(object) => {
                tracing::warn!(object, error = %error, "Ingestion aborted; blob left without a record")
            }
            None => tracing::error!(error = %error, "Ingestion aborted"),
        }
        error
    }
}
