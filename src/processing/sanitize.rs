//! Helpers for normalizing and validating raw client input.

use crate::geo::GeoPoint;

use super::types::ValidationError;

/// Trim arbitrary string input, dropping empties.
pub(crate) fn sanitize_string(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// Parse a required coordinate parameter. Malformed values are rejected, never defaulted.
pub fn parse_coordinate(field: &'static str, raw: Option<&str>) -> Result<f64, ValidationError> {
    let value = sanitize_string(raw).ok_or(ValidationError::MissingCoordinate(field))?;
    value
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| ValidationError::InvalidCoordinate {
            field,
            value: value.to_string(),
        })
}

/// Parse `lat`/`lon` parameters into a validated point.
pub fn parse_location(lat: Option<&str>, lon: Option<&str>) -> Result<GeoPoint, ValidationError> {
    let lat = parse_coordinate("lat", lat)?;
    let lon = parse_coordinate("lon", lon)?;
    GeoPoint::new(lat, lon)
}

/// Parse the optional `range` parameter (kilometers).
pub fn parse_range(raw: Option<&str>) -> Result<Option<f64>, ValidationError> {
    let Some(value) = sanitize_string(raw) else {
        return Ok(None);
    };
    let km = value.strip_suffix("km").unwrap_or(value).trim();
    km.parse::<f64>()
        .ok()
        .filter(|parsed| valid_radius(*parsed))
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidRange(value.to_string()))
}

/// Whether a radius can be handed to the store's distance parser.
pub fn valid_radius(km: f64) -> bool {
    km.is_finite() && km > 0.0
}

/// Normalize the owner identity; empty identities are rejected.
pub fn sanitize_owner(owner: &str) -> Result<String, ValidationError> {
    sanitize_string(Some(owner))
        .map(str::to_string)
        .ok_or(ValidationError::MissingOwner)
}

/// Usernames are non-empty and limited to lowercase ASCII letters and digits.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername)
    }
}

/// Passwords only need to be present.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        Err(ValidationError::MissingPassword)
    } else {
        Ok(())
    }
}

/// Clamp a scorer confidence into `[0, 1]`, mapping non-finite values to `0.0`.
pub(crate) fn sanitize_score(score: f32) -> f32 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
