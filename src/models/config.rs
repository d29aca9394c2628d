//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:8000".to_string(),
    ]
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Apply pending migrations before serving requests.
    #[serde(default)]
    pub run_migrations: bool,
    pub templates_dir: String,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub cloudinary: CloudinaryConfig,
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// Layers `config/default.yaml`, the optional `config/{app_env}.yaml` and
    /// `APP_*` environment variables (`__` separates nested keys, e.g.
    /// `APP_JWT__SECRET`).
    #[cfg(feature = "server")]
    pub fn load(app_env: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Clone, Debug, Deserialize)]
/// Signing secret and lifetimes of issued tokens.
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub email_ttl_secs: i64,
    pub reset_ttl_secs: i64,
    pub user_cache_ttl_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
/// Outbound email settings.
pub struct MailConfig {
    /// ZeroMQ endpoint the emailer service subscribes to.
    pub zmq_emailer_pub: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: String,
    pub list_unsubscribe: String,
}

#[derive(Clone, Debug, Deserialize)]
/// Credentials of the Cloudinary account storing avatars.
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone, Debug, Deserialize)]
/// Per-client quota of the `/users/me` endpoint.
pub struct RateLimitConfig {
    pub me_per_minute: u32,
}
