//! Catalog server and its startup wiring.
//!
//! [`CatalogServer`] owns the configuration and the shared [`ToolRegistry`].
//! Transports and the settings watcher receive clones of it; nothing reaches
//! the registry through a global.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::config::Config;
use crate::domains::catalog::{
    EnvSettings, FileSettings, LayeredSettings, RegistrySnapshot, ToolRegistry,
};

/// The catalog server handler.
#[derive(Clone)]
pub struct CatalogServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The catalog being served.
    registry: Arc<ToolRegistry>,
}

impl CatalogServer {
    /// Create a server, reading the initial catalog from the configured
    /// settings file (if any) overlaid by the environment.
    pub fn new(config: Config) -> Self {
        let file = match &config.catalog.settings_path {
            Some(path) => read_settings_or_empty(path),
            None => Map::new(),
        };

        let overrides = EnvSettings::present();
        if !overrides.is_empty() {
            info!("Catalog settings overridden from environment: {:?}", overrides);
        }

        let snapshot = build_snapshot(&file);
        info!("Serving {} recognized tools", snapshot.tools().len());

        Self::with_registry(config, Arc::new(ToolRegistry::new(snapshot)))
    }

    /// Create a server around an existing registry.
    pub fn with_registry(config: Config, registry: Arc<ToolRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The shared tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

/// Build a snapshot from file settings, with environment variables taking
/// precedence over the file.
fn build_snapshot(file: &Map<String, Value>) -> RegistrySnapshot {
    let env = EnvSettings;
    let layered = LayeredSettings::new().with(&env).with(file);
    RegistrySnapshot::from_settings(&layered)
}

fn read_settings_or_empty(path: &Path) -> Map<String, Value> {
    match FileSettings::read(path) {
        Ok(map) => {
            info!("Loaded catalog settings from {}", path.display());
            map
        }
        Err(e) => {
            warn!("{} - starting with default catalog settings", e);
            Map::new()
        }
    }
}
