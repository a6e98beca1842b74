use geopost::{
    accounts::{AccountService, TokenAuthority},
    api::{self, AppState},
    blob::GcsBlobStore,
    bootstrap, config, logging,
    processing::{PostService, PostSettings},
    scoring::VisionFaceScorer,
    store::{ElasticStore, RecordStore},
};
use std::sync::Arc;
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    let records: Arc<dyn RecordStore> =
        Arc::new(ElasticStore::new().expect("Failed to build record store client"));
    let created = bootstrap::ensure_collections(
        records.as_ref(),
        &config.post_index,
        &config.user_index,
    )
    .await
    .expect("Failed to bootstrap collections");
    tracing::info!(created = ?created, "Collections ready");

    let posts = PostService::new(
        records.clone(),
        Arc::new(GcsBlobStore::new().expect("Failed to build blob store client")),
        Arc::new(VisionFaceScorer::new().expect("Failed to build scoring client")),
        PostSettings {
            collection: config.post_index.clone(),
            default_range_km: config.search_default_range_km,
        },
    );
    let tokens = Arc::new(TokenAuthority::new(
        config.jwt_signing_secret.as_bytes(),
        time::Duration::hours(config.token_ttl_hours),
    ));
    let accounts = AccountService::new(records, config.user_index.clone(), tokens.clone());

    let app = api::create_router(AppState {
        posts: Arc::new(posts),
        accounts: Arc::new(accounts),
        tokens,
        upload_limit: config.max_upload_bytes,
    });

    let port = config.server_port.unwrap_or(DEFAULT_PORT);
    let listener = TcpListener::bind((std::net::Ipv4Addr::UNSPECIFIED, port))
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.expect("Server error");
}
