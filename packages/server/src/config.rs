use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use vidhub_common::StorageConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub access_token_secret: String,
    /// Lifetime of an access token. Default: 1 day.
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    pub refresh_token_secret: String,
    /// Lifetime of a refresh token. Default: 10 days.
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
    /// Mark auth cookies `Secure`. Default: true.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_access_token_ttl_minutes() -> i64 {
    24 * 60
}
fn default_refresh_token_ttl_days() -> i64 {
    10
}
fn default_secure_cookies() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    /// Page size when the client sends none. Default: 10.
    #[serde(default = "default_page_limit")]
    pub default_limit: u64,
    /// Largest page size a client may request. Default: 100.
    #[serde(default = "default_max_page_limit")]
    pub max_limit: u64,
}

fn default_page_limit() -> u64 {
    10
}
fn default_max_page_limit() -> u64 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_page_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MaintenanceConfig {
    /// Seconds between maintenance passes. Default: 300.
    #[serde(default = "default_maintenance_interval_secs")]
    pub interval_secs: u64,
    /// Give up on deleting an orphaned asset after this many attempts. Default: 8.
    #[serde(default = "default_max_asset_delete_attempts")]
    pub max_asset_delete_attempts: i32,
}

fn default_maintenance_interval_secs() -> u64 {
    300
}
fn default_max_asset_delete_attempts() -> i32 {
    8
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_maintenance_interval_secs(),
            max_asset_delete_attempts: default_max_asset_delete_attempts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("VIDHUB_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., VIDHUB__AUTH__ACCESS_TOKEN_SECRET)
            .add_source(Environment::with_prefix("VIDHUB").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
