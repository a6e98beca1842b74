//! Post pipeline: media ingestion, geo and threshold queries, typed materialization.

mod ingest;
pub(crate) mod mappers;
pub mod media;
pub mod query;
pub mod sanitize;
mod service;
pub mod types;

pub use service::{PostApi, PostService, PostSettings};
pub use types::{
    ContentRecord, IngestError, IngestRequest, MediaKind, MediaUpload, QueryError, RadiusQuery,
    ThresholdQuery, ValidationError,
};
