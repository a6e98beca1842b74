//! Post service coordinating the blob store, quality scorer, and record store.

use crate::{
    blob::BlobStore,
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::types::{
        ContentRecord, IngestError, IngestRequest, QueryError, RadiusQuery, ThresholdQuery,
    },
    scoring::QualityScorer,
    store::RecordStore,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Collection name and query defaults for the post service.
#[derive(Debug, Clone)]
pub struct PostSettings {
    /// Collection holding posts.
    pub collection: String,
    /// Radius used when a search supplies none.
    pub default_range_km: f64,
}

/// Owns the adapter handles used by ingestion and queries.
///
/// Handles are read-only after construction; build the service once near process start and
/// share it through an `Arc`. Requests never share mutable state beyond the metrics counters.
pub struct PostService {
    pub(crate) records: Arc<dyn RecordStore>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) scorer: Arc<dyn QualityScorer>,
    pub(crate) settings: PostSettings,
    pub(crate) metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the post service used by the HTTP surface.
#[async_trait]
pub trait PostApi: Send + Sync {
    /// Turn one upload into one stored, queryable record.
    async fn ingest(&self, request: IngestRequest) -> Result<ContentRecord, IngestError>;

    /// Posts within a radius of a point, in store order.
    async fn search_nearby(&self, query: RadiusQuery) -> Result<Vec<ContentRecord>, QueryError>;

    /// Posts whose allow-listed score field is at least the cluster threshold.
    async fn cluster(&self, query: ThresholdQuery) -> Result<Vec<ContentRecord>, QueryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PostService {
    /// Build a service over already-initialized adapters.
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        scorer: Arc<dyn QualityScorer>,
        settings: PostSettings,
    ) -> Self {
        tracing::debug!(
            collection = %settings.collection,
            default_range_km = settings.default_range_km,
            "Post service ready"
        );
        Self {
            records,
            blobs,
            scorer,
            settings,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl PostApi for PostService {
    async fn ingest(&self, request: IngestRequest) -> Result<ContentRecord, IngestError> {
        PostService::ingest(self, request).await
    }

    async fn search_nearby(&self, query: RadiusQuery) -> Result<Vec<ContentRecord>, QueryError> {
        PostService::search_nearby(self, query).await
    }

    async fn cluster(&self, query: ThresholdQuery) -> Result<Vec<ContentRecord>, QueryError> {
        PostService::cluster(self, query).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PostService::metrics_snapshot(self)
    }
}
