use crate::{
    accounts::{Credentials, UserAccount},
    api::{AppState, auth::AuthenticatedUser, error::ApiError},
    metrics::MetricsSnapshot,
    processing::{
        ContentRecord, IngestRequest, MediaUpload, RadiusQuery, ThresholdQuery, ValidationError,
        sanitize::{parse_location, parse_range},
    },
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Multipart part carrying the media file.
const MEDIA_PART: &str = "image";

/// Accept a multipart post (`lat`, `lon`, `message`, `image`) from an authenticated user.
pub(crate) async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let mut lat = None;
    let mut lon = None;
    let mut text = String::new();
    let mut media = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            MEDIA_PART => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                media = Some(MediaUpload { file_name, bytes });
            }
            "lat" => lat = Some(field.text().await.map_err(malformed)?),
            "lon" => lon = Some(field.text().await.map_err(malformed)?),
            "message" => text = field.text().await.map_err(malformed)?,
            other => tracing::debug!(part = other, "Ignoring unknown multipart part"),
        }
    }

    let location = parse_location(lat.as_deref(), lon.as_deref())?;
    let media = media.ok_or(ValidationError::MissingMedia)?;

    let record = state
        .posts
        .ingest(IngestRequest {
            owner: user.username,
            text,
            location: Some(location),
            media: Some(media),
        })
        .await?;
    tracing::info!(id = %record.id, "Post request completed");
    Ok(StatusCode::OK)
}

fn malformed(error: impl std::fmt::Display) -> ValidationError {
    ValidationError::MalformedBody(error.to_string())
}

/// Query string for `GET /search`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    lat: Option<String>,
    lon: Option<String>,
    range: Option<String>,
}

/// Posts within `range` km (default configured) of `lat`/`lon`.
pub(crate) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ContentRecord>>, ApiError> {
    let center = parse_location(params.lat.as_deref(), params.lon.as_deref())?;
    let radius_km = parse_range(params.range.as_deref())?;
    let records = state
        .posts
        .search_nearby(RadiusQuery { center, radius_km })
        .await?;
    Ok(Json(records))
}

/// Query string for `GET /cluster`.
#[derive(Debug, Deserialize)]
pub(crate) struct ClusterParams {
    term: Option<String>,
}

/// Posts whose `term` field meets the cluster threshold.
pub(crate) async fn cluster(
    State(state): State<AppState>,
    Query(params): Query<ClusterParams>,
) -> Result<Json<Vec<ContentRecord>>, ApiError> {
    let query = ThresholdQuery::for_term(params.term.as_deref().unwrap_or_default())?;
    let records = state.posts.cluster(query).await?;
    Ok(Json(records))
}

/// Register an account from a JSON body.
pub(crate) async fn signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let account: UserAccount = serde_json::from_slice(&body).map_err(malformed)?;
    state.accounts.signup(account).await?;
    Ok(StatusCode::OK)
}

/// Exchange credentials for a plain-text bearer token.
pub(crate) async fn login(State(state): State<AppState>, body: Bytes) -> Result<String, ApiError> {
    let credentials: Credentials = serde_json::from_slice(&body).map_err(malformed)?;
    let token = state.accounts.login(credentials).await?;
    Ok(token)
}

pub(crate) async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.posts.metrics_snapshot())
}

/// Empty 200 for `OPTIONS` on any route.
pub(crate) async fn preflight() -> StatusCode {
    StatusCode::OK
}
