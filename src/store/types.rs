//! Shared types used by the record store adapters.

use crate::geo::GeoPoint;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors returned while interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid record store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response (includes timeouts).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The store responded with an unexpected status code.
    #[error("Unexpected record store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// A document could not be encoded for storage.
    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Document returned by the store together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document id the record was written under.
    pub id: String,
    /// Raw document body.
    pub source: Value,
}

/// Filter predicates understood by every [`super::RecordStore`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Documents whose geo field lies within `distance_km` of `center`.
    GeoDistance {
        /// Geo-point field name.
        field: String,
        /// Search center.
        center: GeoPoint,
        /// Great-circle radius in kilometers.
        distance_km: f64,
    },
    /// Documents whose numeric field is greater than or equal to `gte`.
    Range {
        /// Numeric field name.
        field: String,
        /// Inclusive lower bound.
        gte: f64,
    },
    /// Documents whose keyword field equals `value` exactly.
    Term {
        /// Keyword field name.
        field: String,
        /// Exact value to match.
        value: String,
    },
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    pub(crate) hits: SearchHits,
}

#[derive(Deserialize)]
pub(crate) struct SearchHits {
    #[serde(default)]
    pub(crate) hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
pub(crate) struct SearchHit {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    #[serde(rename = "_source", default)]
    pub(crate) source: Option<Value>,
}

#[derive(Deserialize)]
pub(crate) struct CountResponse {
    pub(crate) count: u64,
}

#[derive(Deserialize)]
pub(crate) struct GetResponse {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) found: bool,
    #[serde(rename = "_source", default)]
    pub(crate) source: Option<Value>,
}
