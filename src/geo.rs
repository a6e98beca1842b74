//! WGS84 points and great-circle distance.

use crate::processing::ValidationError;
use serde::{Deserialize, Serialize};

/// Mean earth radius, matching the value Elasticsearch uses for `geo_distance`.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (-90 to 90).
    pub lat: f64,
    /// Longitude (-180 to 180).
    pub lon: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Haversine distance to `other` in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(matches!(
            GeoPoint::new(91.0, 0.0),
            Err(ValidationError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -180.5),
            Err(ValidationError::LongitudeOutOfRange(_))
        ));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn distance_matches_known_city_pair() {
        let san_francisco = GeoPoint::new(37.7749, -122.4194).unwrap();
        let los_angeles = GeoPoint::new(34.0522, -118.2437).unwrap();
        let km = san_francisco.distance_km(&los_angeles);
        assert!((km - 559.0).abs() < 5.0, "unexpected distance {km}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        let point = GeoPoint::new(37.7, -122.4).unwrap();
        assert!(point.distance_km(&point).abs() < 1e-9);
    }
}
