use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

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
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Seconds to wait for a free pooled connection before failing.
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3BackendConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// "filesystem" or "s3".
    pub backend: String,
    /// Root directory for the filesystem backend.
    pub root: String,
    /// Maximum encoded bundle size in bytes.
    pub max_blob_size: u64,
    /// Per-operation deadline for blob store calls, in seconds.
    pub operation_timeout_secs: u64,
    /// Lifetime of on-demand presigned download URLs, in seconds.
    pub presign_ttl_secs: u32,
    pub s3: Option<S3BackendConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["*".to_string()])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("auth.token_ttl_hours", 168)?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.root", "./data/objects")?
            .set_default("storage.max_blob_size", 32 * 1024 * 1024)?
            .set_default("storage.operation_timeout_secs", 10)?
            .set_default("storage.presign_ttl_secs", 600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PRAXIS__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("PRAXIS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
