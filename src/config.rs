use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the geopost server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the Elasticsearch cluster holding posts and accounts.
    pub elasticsearch_url: String,
    /// Optional API key sent as `Authorization: ApiKey ...`.
    pub elasticsearch_api_key: Option<String>,
    /// Collection (index) name for posts.
    pub post_index: String,
    /// Collection (index) name for user accounts.
    pub user_index: String,
    /// Bucket receiving uploaded media.
    pub gcs_bucket: String,
    /// Base URL of the object storage JSON API.
    pub gcs_base_url: String,
    /// Optional OAuth bearer token for the object storage API.
    pub gcs_access_token: Option<String>,
    /// Base URL of the image annotation API.
    pub vision_url: String,
    /// Optional API key for the image annotation API.
    pub vision_api_key: Option<String>,
    /// Symmetric secret used to sign and verify bearer tokens.
    pub jwt_signing_secret: String,
    /// Lifetime of issued tokens, in hours.
    pub token_ttl_hours: i64,
    /// Radius applied to searches that do not supply `range`.
    pub search_default_range_km: f64,
    /// Per-request timeout applied to every adapter client.
    pub adapter_timeout_secs: u64,
    /// Upper bound on multipart upload bodies.
    pub max_upload_bytes: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Radius used when neither the caller nor the environment chooses one.
pub const DEFAULT_RANGE_KM: f64 = 200.0;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = load_env("JWT_SIGNING_SECRET")?;
        if secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SIGNING_SECRET".into()));
        }

        Ok(Self {
            elasticsearch_url: load_env("ELASTICSEARCH_URL")?,
            elasticsearch_api_key: load_env_optional("ELASTICSEARCH_API_KEY"),
            post_index: load_env_optional("POST_INDEX").unwrap_or_else(|| "post".into()),
            user_index: load_env_optional("USER_INDEX").unwrap_or_else(|| "user".into()),
            gcs_bucket: load_env("GCS_BUCKET")?,
            gcs_base_url: load_env_optional("GCS_BASE_URL")
                .unwrap_or_else(|| "https://storage.googleapis.com".into()),
            gcs_access_token: load_env_optional("GCS_ACCESS_TOKEN"),
            vision_url: load_env_optional("VISION_URL")
                .unwrap_or_else(|| "https://vision.googleapis.com".into()),
            vision_api_key: load_env_optional("VISION_API_KEY"),
            jwt_signing_secret: secret,
            token_ttl_hours: parse_optional("TOKEN_TTL_HOURS")?
                .filter(|hours: &i64| *hours > 0)
                .unwrap_or(24),
            search_default_range_km: parse_optional("SEARCH_DEFAULT_RANGE_KM")?
                .map(|km: f64| {
                    if km.is_finite() && km > 0.0 {
                        Ok(km)
                    } else {
                        Err(ConfigError::InvalidValue("SEARCH_DEFAULT_RANGE_KM".into()))
                    }
                })
                .transpose()?
                .unwrap_or(DEFAULT_RANGE_KM),
            adapter_timeout_secs: parse_optional("ADAPTER_TIMEOUT_SECS")?.unwrap_or(10),
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES")?.unwrap_or(32 * 1024 * 1024),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        elasticsearch_url = %config.elasticsearch_url,
        post_index = %config.post_index,
        user_index = %config.user_index,
        bucket = %config.gcs_bucket,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
