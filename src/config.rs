//! Configuration management for the catalog services

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::{env, time::Duration};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Port of the HTTP health sidecar; disabled when unset
    pub health_port: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of read-through entries (`book:<id>`, `books`)
    pub ttl_secs: u64,
    /// Lifetime of the advisory borrow lock
    pub lock_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    /// Upper bound on rows returned by any list operation
    pub list_limit: i64,
    pub recommendation_limit: i64,
}

/// Addresses of sibling services, `host:port` or full URIs
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    pub user_service: Option<String>,
    pub author_service: Option<String>,
    pub category_service: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // CATALOG_DATABASE__MAX_CONNECTIONS=20 and friends
            .add_source(
                Environment::with_prefix("CATALOG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Deployment variables shared by every service
            .set_override_option("auth.jwt_secret", env::var("SECRET_KEY").ok())?
            .set_override_option("server.port", env::var("APP_PORT").ok())?
            .set_override_option("server.health_port", env::var("HEALTH_PORT").ok())?
            .set_override_option("database.host", env::var("DB_HOST").ok())?
            .set_override_option("database.port", env::var("DB_PORT").ok())?
            .set_override_option("database.user", env::var("DB_USER").ok())?
            .set_override_option("database.password", env::var("DB_PASS").ok())?
            .set_override_option("database.name", env::var("DB_NAME").ok())?
            .set_override_option("redis.host", env::var("REDIS_HOST").ok())?
            .set_override_option("redis.port", env::var("REDIS_PORT").ok())?
            .set_override_option("upstream.user_service", env::var("USER_SERVICE").ok())?
            .set_override_option("upstream.author_service", env::var("AUTHOR_SERVICE").ok())?
            .set_override_option("upstream.category_service", env::var("CATEGORY_SERVICE").ok())?
            .set_override_option("logging.level", env::var("LOG_LEVEL").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.auth.check_secret()?;
        Ok(config)
    }
}

/// Secrets shipped in sample files; tokens signed with them are forgeable
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "change-this-secret-in-production"];

impl AuthConfig {
    /// Refuse to start with a missing or sample signing secret
    pub fn check_secret(&self) -> Result<(), ConfigError> {
        let secret = self.jwt_secret.trim();
        if secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret is not set (SECRET_KEY)".to_string(),
            ));
        }
        if PLACEHOLDER_SECRETS.contains(&secret) {
            return Err(ConfigError::Message(
                "auth.jwt_secret still has its sample value".to_string(),
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Connection options built field by field so passwords need no URL escaping
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }
}

impl UpstreamConfig {
    pub fn user_endpoint(&self) -> Result<String, ConfigError> {
        required_endpoint(self.user_service.as_deref(), "upstream.user_service")
    }

    pub fn author_endpoint(&self) -> Result<String, ConfigError> {
        required_endpoint(self.author_service.as_deref(), "upstream.author_service")
    }

    pub fn category_endpoint(&self) -> Result<String, ConfigError> {
        required_endpoint(self.category_service.as_deref(), "upstream.category_service")
    }
}

fn required_endpoint(value: Option<&str>, key: &str) -> Result<String, ConfigError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(addr) => Ok(normalize_endpoint(addr)),
        None => Err(ConfigError::NotFound(key.to_string())),
    }
}

/// Turn a bare `host:port` into a URI tonic can dial
pub fn normalize_endpoint(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            health_port: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "catalog".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            lock_ttl_secs: 30,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            list_limit: 200,
            recommendation_limit: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
