//! HTTP surface for geopost.
//!
//! - `POST /post` – multipart upload (`lat`, `lon`, `message`, `image`); authenticated.
//! - `GET /search` – posts within `range` km of `lat`/`lon`; authenticated.
//! - `GET /cluster` – posts whose `term` score is at least 0.9; authenticated.
//! - `POST /signup` – register `{username, password, age, gender}`.
//! - `POST /login` – exchange `{username, password}` for a bearer token.
//! - `GET /metrics` – ingestion and query counters.
//!
//! Every route answers `OPTIONS` with an empty 200 and carries permissive CORS headers.

pub mod auth;
pub mod error;
mod handlers;

use crate::{
    accounts::{AccountApi, TokenAuthority},
    processing::PostApi,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use auth::AuthenticatedUser;
pub use error::ApiError;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Post ingestion and queries.
    pub posts: Arc<dyn PostApi>,
    /// Signup and login.
    pub accounts: Arc<dyn AccountApi>,
    /// Verifies bearer tokens on authenticated routes.
    pub tokens: Arc<TokenAuthority>,
    /// Maximum accepted request body for uploads, in bytes.
    pub upload_limit: usize,
}

/// Build the HTTP router over the given state.
pub fn create_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route(
            "/post",
            post(handlers::create_post).options(handlers::preflight),
        )
        .route(
            "/search",
            get(handlers::search).options(handlers::preflight),
        )
        .route(
            "/cluster",
            get(handlers::cluster).options(handlers::preflight),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .layer(DefaultBodyLimit::max(state.upload_limit));

    let public = Router::new()
        .route(
            "/signup",
            post(handlers::signup).options(handlers::preflight),
        )
        .route("/login", post(handlers::login).options(handlers::preflight))
        .route(
            "/metrics",
            get(handlers::metrics).options(handlers::preflight),
        );

    authenticated
        .merge(public)
        .layer(cors())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accounts::{AccountError, Credentials, UserAccount},
        geo::GeoPoint,
        metrics::MetricsSnapshot,
        processing::{
            ContentRecord, IngestError, IngestRequest, MediaKind, QueryError, RadiusQuery,
            ThresholdQuery,
        },
        store::StoreError,
    };
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, Response, StatusCode},
    };
    use serde_json::Value;
    use time::Duration;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    const BOUNDARY: &str = "geopost-test-boundary";

    #[derive(Default)]
    struct StubPosts {
        ingested: Mutex<Vec<IngestRequest>>,
        radius_queries: Mutex<Vec<RadiusQuery>>,
        fail_queries: bool,
    }

    fn sample_record() -> ContentRecord {
        ContentRecord {
            id: "post-1".into(),
            owner: "alice".into(),
            text: "hi".into(),
            location: GeoPoint::new(37.7, -122.4).unwrap(),
            media_locator: "https://media.test/post-1".into(),
            media_kind: MediaKind::Image,
            quality_score: 0.95,
        }
    }

    #[async_trait]
    impl PostApi for StubPosts {
        async fn ingest(&self, request: IngestRequest) -> Result<ContentRecord, IngestError> {
            self.ingested.lock().await.push(request);
            Ok(sample_record())
        }

        async fn search_nearby(
            &self,
            query: RadiusQuery,
        ) -> Result<Vec<ContentRecord>, QueryError> {
            if self.fail_queries {
                return Err(StoreError::InvalidUrl("http://internal".into()).into());
            }
            self.radius_queries.lock().await.push(query);
            Ok(vec![sample_record()])
        }

        async fn cluster(&self, query: ThresholdQuery) -> Result<Vec<ContentRecord>, QueryError> {
            assert_eq!(query.field(), "face");
            Ok(vec![sample_record()])
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                posts_ingested: 3,
                ..Default::default()
            }
        }
    }

    struct StubAccounts;

    #[async_trait]
    impl AccountApi for StubAccounts {
        async fn signup(&self, account: UserAccount) -> Result<(), AccountError> {
            if account.username == "taken" {
                return Err(AccountError::UsernameTaken(account.username));
            }
            Ok(())
        }

        async fn login(&self, credentials: Credentials) -> Result<String, AccountError> {
            if credentials.password == "pw" {
                Ok(format!("token-for-{}", credentials.username))
            } else {
                Err(AccountError::InvalidCredentials)
            }
        }
    }

    struct Harness {
        app: Router,
        posts: Arc<StubPosts>,
        tokens: Arc<TokenAuthority>,
    }

    fn harness_with(posts: StubPosts) -> Harness {
        let posts = Arc::new(posts);
        let tokens = Arc::new(TokenAuthority::new(b"router-secret", Duration::hours(1)));
        let app = create_router(AppState {
            posts: posts.clone(),
            accounts: Arc::new(StubAccounts),
            tokens: tokens.clone(),
            upload_limit: 1024 * 1024,
        });
        Harness { app, posts, tokens }
    }

    fn harness() -> Harness {
        harness_with(StubPosts::default())
    }

    fn bearer(tokens: &TokenAuthority) -> String {
        format!("Bearer {}", tokens.issue("alice").unwrap())
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn post_request(auth: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/post")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::from(body)).expect("request")
    }

    fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).expect("request")
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn authenticated_routes_require_bearer() {
        let h = harness();
        let response = h
            .app
            .oneshot(get_request("/search?lat=1&lon=2", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn foreign_token_is_rejected() {
        let h = harness();
        let other = TokenAuthority::new(b"other", Duration::hours(1));
        let response = h
            .app
            .oneshot(get_request("/search?lat=1&lon=2", Some(&bearer(&other))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn options_bypasses_auth_with_empty_ok() {
        let h = harness();
        for uri in ["/post", "/search", "/cluster", "/signup", "/login"] {
            let response = h
                .app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(Method::OPTIONS)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "OPTIONS {uri}");
            assert!(body_text(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let h = harness();
        let response = h
            .app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/login")
                    .header("origin", "https://client.test")
                    .body(Body::from(r#"{"username":"a","password":"pw"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn post_uses_token_identity_and_requires_image() {
        let h = harness();
        let auth = bearer(&h.tokens);

        let missing = multipart_body(&[("lat", None, "37.7"), ("lon", None, "-122.4")]);
        let response = h
            .app
            .clone()
            .oneshot(post_request(Some(&auth), missing))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Image is not available");

        let full = multipart_body(&[
            ("lat", None, "37.7"),
            ("lon", None, "-122.4"),
            ("message", None, "hello"),
            ("user", None, "mallory"),
            ("image", Some("a.jpg"), "jpegbytes"),
        ]);
        let response = h
            .app
            .oneshot(post_request(Some(&auth), full))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());

        let ingested = h.posts.ingested.lock().await;
        assert_eq!(ingested.len(), 1);
        assert_eq!(ingested[0].owner, "alice");
        assert_eq!(ingested[0].text, "hello");
        let media = ingested[0].media.as_ref().expect("media");
        assert_eq!(media.file_name, "a.jpg");
        assert_eq!(&media.bytes[..], b"jpegbytes");
    }

    #[tokio::test]
    async fn post_with_malformed_coordinates_is_rejected() {
        let h = harness();
        let body = multipart_body(&[
            ("lat", None, "north"),
            ("lon", None, "-122.4"),
            ("image", Some("a.jpg"), "x"),
        ]);
        let response = h
            .app
            .oneshot(post_request(Some(&bearer(&h.tokens)), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.posts.ingested.lock().await.is_empty());
    }

    #[tokio::test]
    async fn search_parses_coordinates_and_range() {
        let h = harness();
        let auth = bearer(&h.tokens);
        let response = h
            .app
            .clone()
            .oneshot(get_request(
                "/search?lat=37.7&lon=-122.4&range=50",
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json[0]["user"], "alice");
        assert_eq!(json[0]["face"], 0.95);

        let queries = h.posts.radius_queries.lock().await;
        assert_eq!(queries[0].radius_km, Some(50.0));
        assert_eq!(queries[0].center, GeoPoint::new(37.7, -122.4).unwrap());
    }

    #[tokio::test]
    async fn search_rejects_bad_input() {
        let h = harness();
        let auth = bearer(&h.tokens);
        for uri in [
            "/search?lat=abc&lon=1",
            "/search?lon=1",
            "/search?lat=91&lon=1",
            "/search?lat=1&lon=1&range=-5",
        ] {
            let response = h
                .app
                .clone()
                .oneshot(get_request(uri, Some(&auth)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
        assert!(h.posts.radius_queries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn store_failures_are_opaque_500s() {
        let h = harness_with(StubPosts {
            fail_queries: true,
            ..Default::default()
        });
        let response = h
            .app
            .oneshot(get_request(
                "/search?lat=1&lon=1",
                Some(&bearer(&h.tokens)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Failed to read posts");
    }

    #[tokio::test]
    async fn cluster_accepts_allow_listed_terms_only() {
        let h = harness();
        let auth = bearer(&h.tokens);
        let ok = h
            .app
            .clone()
            .oneshot(get_request("/cluster?term=face", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let rejected = h
            .app
            .oneshot(get_request("/cluster?term=message", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_maps_decode_and_conflict_to_400() {
        let h = harness();
        let created = h
            .app
            .clone()
            .oneshot(json_request(
                "/signup",
                r#"{"username":"alice","password":"pw","age":30,"gender":"f"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::OK);

        let malformed = h
            .app
            .clone()
            .oneshot(json_request("/signup", "{not json"))
            .await
            .unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let taken = h
            .app
            .oneshot(json_request(
                "/signup",
                r#"{"username":"taken","password":"pw"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(taken.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_returns_plain_text_token_or_401() {
        let h = harness();
        let ok = h
            .app
            .clone()
            .oneshot(json_request(
                "/login",
                r#"{"username":"alice","password":"pw"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert!(
            ok.headers()[CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        assert_eq!(body_text(ok).await, "token-for-alice");

        let denied = h
            .app
            .oneshot(json_request(
                "/login",
                r#"{"username":"alice","password":"nope"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn metrics_are_public() {
        let h = harness();
        let response = h.app.oneshot(get_request("/metrics", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["posts_ingested"], 3);
    }
}
