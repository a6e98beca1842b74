//! Process-local record store evaluating predicates in memory.
//!
//! Used by tests and local runs without an Elasticsearch cluster. Documents are kept in
//! insertion order per collection, which doubles as the search result order.

use crate::geo::GeoPoint;
use crate::store::{
    RecordStore,
    types::{Predicate, StoreError, StoredDocument},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Collection {
    schema: Value,
    documents: Vec<StoredDocument>,
}

/// In-memory [`RecordStore`] with the same predicate semantics as the HTTP store.
#[derive(Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryRecordStore {
    /// Create an empty store with no collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|entry| entry.documents.len())
            .unwrap_or(0)
    }

    /// Schema the collection was created with, if any.
    pub async fn schema(&self, collection: &str) -> Option<Value> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|entry| entry.schema.clone())
    }
}

/// Evaluate a predicate against one document body.
pub fn matches(predicate: &Predicate, document: &Value) -> bool {
    match predicate {
        Predicate::GeoDistance {
            field,
            center,
            distance_km,
        } => document
            .get(field)
            .and_then(read_point)
            .is_some_and(|point| center.distance_km(&point) <= *distance_km),
        // Scores are mapped as `float`, so both sides compare at f32 precision.
        Predicate::Range { field, gte } => document
            .get(field)
            .and_then(Value::as_f64)
            .is_some_and(|value| value as f32 >= *gte as f32),
        Predicate::Term { field, value } => document
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|candidate| candidate == value),
    }
}

fn read_point(value: &Value) -> Option<GeoPoint> {
    let lat = value.get("lat")?.as_f64()?;
    let lon = value.get("lon")?.as_f64()?;
    GeoPoint::new(lat, lon).ok()
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn exists(&self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.collections.read().await.contains_key(collection))
    }

    async fn create_collection(&self, collection: &str, schema: &Value) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .schema = schema.clone();
        Ok(())
    }

    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let entry = guard.entry(collection.to_string()).or_default();
        let stored = StoredDocument {
            id: id.to_string(),
            source: document.clone(),
        };
        match entry.documents.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = stored,
            None => entry.documents.push(stored),
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.collections.read().await.get(collection).and_then(|entry| {
            entry
                .documents
                .iter()
                .find(|document| document.id == id)
                .cloned()
        }))
    }

    async fn search(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|entry| {
                entry
                    .documents
                    .iter()
                    .filter(|document| matches(predicate, &document.source))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count_matches(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<u64, StoreError> {
        Ok(self.search(collection, predicate).await?.len() as u64)
    }
}
