//! Query engine: build a predicate, run one search, materialize typed records.

use crate::{
    geo::GeoPoint,
    processing::{
        mappers::{decode_post, materialize},
        sanitize::valid_radius,
        service::PostService,
        types::{ContentRecord, QueryError, RadiusQuery, ThresholdQuery, ValidationError},
    },
    store::Predicate,
};

/// Geo-point field holding the post location.
pub const LOCATION_FIELD: &str = "location";

/// Inclusive lower bound used by cluster queries.
pub const CLUSTER_THRESHOLD: f64 = 0.9;

/// Predicate selecting posts within `radius_km` of `center`.
pub fn radius_predicate(center: GeoPoint, radius_km: f64) -> Predicate {
    Predicate::GeoDistance {
        field: LOCATION_FIELD.to_string(),
        center,
        distance_km: radius_km,
    }
}

/// Predicate selecting posts whose `field` is at least [`CLUSTER_THRESHOLD`].
pub fn threshold_predicate(query: ThresholdQuery) -> Predicate {
    Predicate::Range {
        field: query.field().to_string(),
        gte: CLUSTER_THRESHOLD,
    }
}

impl PostService {
    /// Posts within the requested (or default) radius of a point.
    pub async fn search_nearby(
        &self,
        query: RadiusQuery,
    ) -> Result<Vec<ContentRecord>, QueryError> {
        let radius_km = match query.radius_km {
            Some(km) if valid_radius(km) => km,
            Some(km) => return Err(ValidationError::InvalidRange(km.to_string()).into()),
            None => self.settings.default_range_km,
        };
        tracing::info!(
            lat = query.center.lat,
            lon = query.center.lon,
            radius_km,
            "Radius search"
        );
        self.run(radius_predicate(query.center, radius_km)).await
    }

    /// Posts whose allow-listed score field meets the cluster threshold.
    pub async fn cluster(&self, query: ThresholdQuery) -> Result<Vec<ContentRecord>, QueryError> {
        tracing::info!(field = query.field(), threshold = CLUSTER_THRESHOLD, "Cluster search");
        self.run(threshold_predicate(query)).await
    }

    async fn run(&self, predicate: Predicate) -> Result<Vec<ContentRecord>, QueryError> {
        let documents = self
            .records
            .search(&self.settings.collection, &predicate)
            .await?;
        let (records, dropped) = materialize("post", documents, decode_post);
        self.metrics.record_query(dropped);
        tracing::debug!(results = records.len(), dropped, "Query materialized");
        Ok(records)
    }
}
