//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

/// Which store backs the service.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
    /// JSON seed loaded into the in-memory backend at startup.
    pub seed_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    /// Directory for daily rolling log files. Stdout only when unset.
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Layers: built-in defaults, `config/default`, `config/{APP_ENV}`, then
    /// `MENUACL__*` environment variables.
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("MENUACL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Built-in defaults only; used by tests and as the base layer of `load`.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "menuacl-server")?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "postgres://localhost/menuacl")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("database.run_migrations", true)?
            .set_default("log.level", "info")?
            .set_default("log.json", true)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config = AppConfig::defaults().unwrap();
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert!(config.log.directory.is_none());
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173".to_string()]);
    }
}
