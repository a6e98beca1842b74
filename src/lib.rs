#![deny(missing_docs)]

//! Core library for the geopost service: geotagged posts with media, radius and score queries,
//! and token-authenticated accounts.

/// User accounts and bearer tokens.
pub mod accounts;
/// HTTP routing and REST handlers.
pub mod api;
/// Object storage for uploaded media.
pub mod blob;
/// Collection bootstrap with field mappings.
pub mod bootstrap;
/// Environment-driven configuration management.
pub mod config;
/// Geographic points and great-circle distance.
pub mod geo;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion and query metrics helpers.
pub mod metrics;
/// Post ingestion pipeline and query engine.
pub mod processing;
/// Media quality scoring.
pub mod scoring;
/// Document store integration.
pub mod store;
pub(crate) mod transport;
