//! Configuration management for the catalog server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, a `.env` file, or defaults.
//!
//! Server settings (where to listen, how to log) live here. The catalog
//! itself is configured through the `sakai.cle.*` settings described in
//! [`crate::domains::catalog::settings`].

use super::error::{Error, Result};
use super::transport::HttpConfig;
use std::path::PathBuf;
use tracing::{info, warn};

/// Main configuration structure for the catalog server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP transport configuration.
    pub transport: HttpConfig,

    /// Where the catalog settings come from and how often they are re-read.
    pub catalog: CatalogConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The name of the server as reported in logs and health checks.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Catalog settings source configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// JSON file holding `sakai.cle.*` settings.
    /// If None, settings come from the environment and defaults only.
    pub settings_path: Option<PathBuf>,

    /// Seconds between checks of the settings file. 0 disables reloading.
    pub reload_interval_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            settings_path: None,
            reload_interval_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "cle-tools".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: HttpConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `CLE_`.
    /// For example: `CLE_SERVER_NAME`, `CLE_LOG_LEVEL`, `CLE_SETTINGS_PATH`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("CLE_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("CLE_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = HttpConfig::from_env();

        if let Ok(path) = std::env::var("CLE_SETTINGS_PATH") {
            config.catalog.settings_path = Some(PathBuf::from(path));
            info!("Catalog settings file: {:?}", config.catalog.settings_path);
        } else {
            warn!(
                "CLE_SETTINGS_PATH not set - catalog settings come from the \
                 environment and built-in defaults only."
            );
        }

        if let Ok(interval) = std::env::var("CLE_RELOAD_INTERVAL_SECS") {
            config.catalog.reload_interval_secs = interval
                .parse()
                .unwrap_or(CatalogConfig::default().reload_interval_secs);
        }

        config
    }

    /// Check values that would otherwise fail later at startup.
    pub fn validate(&self) -> Result<()> {
        if !self.transport.tools_path.starts_with('/') {
            return Err(Error::config(format!(
                "tool list path must start with '/': {}",
                self.transport.tools_path
            )));
        }

        if self.transport.tools_path == "/health" {
            return Err(Error::config("tool list path conflicts with /health"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ENV_TEST_LOCK;

    #[test]
    fn test_settings_path_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("CLE_SETTINGS_PATH", "/etc/cle/tools.json");
            std::env::set_var("CLE_RELOAD_INTERVAL_SECS", "5");
        }
        let config = Config::from_env();
        assert_eq!(
            config.catalog.settings_path,
            Some(PathBuf::from("/etc/cle/tools.json"))
        );
        assert_eq!(config.catalog.reload_interval_secs, 5);
        unsafe {
            std::env::remove_var("CLE_SETTINGS_PATH");
            std::env::remove_var("CLE_RELOAD_INTERVAL_SECS");
        }
    }

    #[test]
    fn test_bad_reload_interval_falls_back() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("CLE_RELOAD_INTERVAL_SECS", "soon");
        }
        let config = Config::from_env();
        assert_eq!(config.catalog.reload_interval_secs, 30);
        unsafe {
            std::env::remove_var("CLE_RELOAD_INTERVAL_SECS");
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transport.tools_path, "/var/basiclti/cletools");
    }

    #[test]
    fn test_validate_rejects_relative_path() {
        let mut config = Config::default();
        config.transport.tools_path = "var/basiclti/cletools".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
