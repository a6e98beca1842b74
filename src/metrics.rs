use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion and query activity.
#[derive(Default)]
pub struct PipelineMetrics {
    posts_ingested: AtomicU64,
    images_scored: AtomicU64,
    ingest_failures: AtomicU64,
    orphaned_blobs: AtomicU64,
    queries_served: AtomicU64,
    hits_dropped: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a post that reached the record store.
    pub fn record_post(&self, scored: bool) {
        self.posts_ingested.fetch_add(1, Ordering::Relaxed);
        if scored {
            self.images_scored.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an aborted ingestion; `orphaned` is set when a blob was already written.
    pub fn record_failure(&self, orphaned: bool) {
        self.ingest_failures.fetch_add(1, Ordering::Relaxed);
        if orphaned {
            self.orphaned_blobs.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a completed query and how many hits failed to decode.
    pub fn record_query(&self, dropped: u64) {
        self.queries_served.fetch_add(1, Ordering::Relaxed);
        self.hits_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posts_ingested: self.posts_ingested.load(Ordering::Relaxed),
            images_scored: self.images_scored.load(Ordering::Relaxed),
            ingest_failures: self.ingest_failures.load(Ordering::Relaxed),
            orphaned_blobs: self.orphaned_blobs.load(Ordering::Relaxed),
            queries_served: self.queries_served.load(Ordering::Relaxed),
            hits_dropped: self.hits_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of the counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Posts persisted since startup.
    pub posts_ingested: u64,
    /// Posts whose image went through quality scoring.
    pub images_scored: u64,
    /// Ingestions aborted at any step.
    pub ingest_failures: u64,
    /// Aborted ingestions that left a blob without a record.
    pub orphaned_blobs: u64,
    /// Radius and threshold queries answered.
    pub queries_served: u64,
    /// Search hits skipped because they failed to decode.
    pub hits_dropped: u64,
}
