//! Record store integration: a uniform document interface keyed by collection and id.

pub mod client;
pub mod memory;
pub mod query;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use client::ElasticStore;
pub use memory::InMemoryRecordStore;
pub use types::{Predicate, StoreError, StoredDocument};

/// Document store operations required by the ingestion pipeline, query engine, and accounts.
///
/// `put` is an upsert keyed by `id`. `search` returns matches in store-defined order. There is
/// no transactional guarantee across multiple `put` calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Report whether the collection exists.
    async fn exists(&self, collection: &str) -> Result<bool, StoreError>;

    /// Create a collection with the given schema descriptor.
    async fn create_collection(&self, collection: &str, schema: &Value) -> Result<(), StoreError>;

    /// Write `document` under `id`, replacing any previous version.
    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError>;

    /// Fetch a single document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Return every document matching the predicate.
    async fn search(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Count documents matching the predicate.
    async fn count_matches(&self, collection: &str, predicate: &Predicate)
    -> Result<u64, StoreError>;
}
