//! Translation of [`Predicate`] values into Elasticsearch query DSL.

use serde_json::{Value, json};

use super::types::Predicate;

/// Render a predicate as the `query` clause of a search or count request.
pub fn to_query_dsl(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::GeoDistance {
            field,
            center,
            distance_km,
        } => json!({
            "geo_distance": {
                "distance": format_distance(*distance_km),
                field.as_str(): { "lat": center.lat, "lon": center.lon }
            }
        }),
        Predicate::Range { field, gte } => json!({
            "range": { field.as_str(): { "gte": gte } }
        }),
        Predicate::Term { field, value } => json!({
            "term": { field.as_str(): value }
        }),
    }
}

/// Wrap a predicate into a complete request body.
pub fn search_body(predicate: &Predicate) -> Value {
    json!({ "query": to_query_dsl(predicate) })
}

/// Format a kilometer radius the way the distance parser expects (`"200km"`).
pub fn format_distance(distance_km: f64) -> String {
    format!("{distance_km}km")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    #[test]
    fn geo_distance_uses_unit_suffix() {
        let dsl = to_query_dsl(&Predicate::GeoDistance {
            field: "location".into(),
            center: GeoPoint::new(37.7, -122.4).unwrap(),
            distance_km: 200.0,
        });

        assert_eq!(
            dsl,
            json!({
                "geo_distance": {
                    "distance": "200km",
                    "location": { "lat": 37.7, "lon": -122.4 }
                }
            })
        );
    }

    #[test]
    fn fractional_distance_is_preserved() {
        assert_eq!(format_distance(12.5), "12.5km");
    }

    #[test]
    fn range_renders_inclusive_lower_bound() {
        let body = search_body(&Predicate::Range {
            field: "face".into(),
            gte: 0.9,
        });

        assert_eq!(
            body,
            json!({ "query": { "range": { "face": { "gte": 0.9 } } } })
        );
    }

    #[test]
    fn term_matches_exact_value() {
        let dsl = to_query_dsl(&Predicate::Term {
            field: "username".into(),
            value: "alice".into(),
        });
        assert_eq!(dsl, json!({ "term": { "username": "alice" } }));
    }
}
