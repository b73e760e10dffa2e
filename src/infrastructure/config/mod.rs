use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// File looked up in the working directory
pub const CONFIG_FILE: &str = "cleaner.toml";

/// Prefix of environment overrides, e.g. `CLEANER_PORT=8080`
pub const ENV_PREFIX: &str = "CLEANER_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Largest accepted multipart body in bytes
    pub max_upload_bytes: usize,

    /// `tracing` env-filter directive
    pub log_filter: String,

    /// actix worker threads; 0 keeps the actix default
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            max_upload_bytes: 50 * 1024 * 1024,
            log_filter: "info".to_string(),
            workers: 0,
        }
    }
}

impl ServerConfig {
    /// Defaults, then `cleaner.toml`, then `CLEANER_*` environment variables
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: ServerConfig = figment
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::ValidationError("host must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(AppError::ValidationError(
                "max_upload_bytes must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
