//! Configuration management
//!
//! Loaded once at process start from an optional `server.toml` plus
//! `CLOUDFILES_*` environment overrides, validated, then passed by
//! reference into the services. No module-level singletons.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Directory beneath which all file operations are sandboxed.
    pub data_directory: String,

    /// SQLite database holding user and session records.
    pub database_path: String,

    /// Bind address for the HTTP-facing collaborator.
    pub host: String,
    pub port: u16,

    /// Log level hint for the embedding process.
    pub log_level: String,

    /// Sliding session expiration window, in seconds.
    pub session_expiry_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_directory: "data".into(),
            database_path: "users.db".into(),
            host: "127.0.0.1".into(),
            port: 8081,
            log_level: "INFO".into(),
            session_expiry_secs: 86_400,
        }
    }
}

impl ServerConfig {
    const ENV_PREFIX: &'static str = "CLOUDFILES";

    /// Load configuration from `server.toml` (if present) with environment
    /// overrides, falling back to defaults for anything unspecified.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("data_directory", defaults.data_directory)?
            .set_default("database_path", defaults.database_path)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("session_expiry_secs", defaults.session_expiry_secs)?
            .add_source(File::with_name("server").required(false))
            .add_source(Environment::with_prefix(Self::ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.data_directory.trim().is_empty() {
            return Err(ConfigError::Message("data_directory cannot be empty".into()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::Message("database_path cannot be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }
        if self.session_expiry_secs == 0 {
            return Err(ConfigError::Message(
                "session_expiry_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn data_root_path(&self) -> PathBuf {
        PathBuf::from(&self.data_directory)
    }

    pub fn session_expiry(&self) -> Duration {
        Duration::from_secs(self.session_expiry_secs)
    }

    /// Bind address and port as a socket string.
    pub fn bind_socket(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
