//! Application configuration loaded from environment variables.

use std::env;

use bitacora_infra::database::DatabaseConfig;
use bitacora_infra::{JwtConfig, UploadConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required and have deliberately
    /// no fallback; everything else defaults sensibly.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let mut database = DatabaseConfig::new(url);
        if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
            database.max_connections = max;
        }
        if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
            database.min_connections = min;
        }

        let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        let mut jwt = JwtConfig::new(secret);
        if let Some(hours) = parse_var("JWT_EXPIRATION_HOURS") {
            jwt.expiration_hours = hours;
        }

        let mut uploads =
            UploadConfig::new(env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()));
        if let Some(max) = parse_var("UPLOAD_MAX_BYTES") {
            uploads.max_bytes = max;
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            jwt,
            uploads,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}
