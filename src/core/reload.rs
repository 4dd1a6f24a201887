//! Settings file watcher.
//!
//! Administrators change the catalog by editing the settings file. The
//! watcher re-reads it on a fixed interval and, whenever its contents differ
//! from the last successful read, rebuilds the catalog snapshot and swaps it
//! into the registry. A file that cannot be read or parsed leaves the current
//! snapshot in place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::CatalogConfig;
use super::error::Result;
use crate::domains::catalog::{
    EnvSettings, FileSettings, LayeredSettings, LoadOutcome, SettingsError, ToolRegistry,
};

/// Polls the settings file and reloads the registry on change.
pub struct SettingsWatcher {
    path: PathBuf,
    interval: Duration,
    registry: Arc<ToolRegistry>,
    last_contents: Option<String>,
}

impl SettingsWatcher {
    /// Create a watcher, or `None` when no settings file is configured or
    /// reloading is disabled.
    pub fn new(config: &CatalogConfig, registry: Arc<ToolRegistry>) -> Option<Self> {
        let path = config.settings_path.clone()?;
        if config.reload_interval_secs == 0 {
            return None;
        }

        Some(Self {
            path,
            interval: Duration::from_secs(config.reload_interval_secs),
            registry,
            last_contents: None,
        })
    }

    /// Check the settings file once.
    ///
    /// Returns `Ok(None)` when the file is unchanged since the last
    /// successful reload.
    pub async fn reload_once(&mut self) -> Result<Option<LoadOutcome>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SettingsError::Io {
                path: self.path.clone(),
                source,
            })?;

        if self.last_contents.as_deref() == Some(contents.as_str()) {
            debug!("Settings file unchanged: {}", self.path.display());
            return Ok(None);
        }

        let file: Map<String, Value> = FileSettings::parse(&self.path, &contents)?;
        let env = EnvSettings;
        let layered = LayeredSettings::new().with(&env).with(&file);
        let outcome = self.registry.load(&layered);

        self.last_contents = Some(contents);
        Ok(Some(outcome))
    }

    /// Run the watcher on the current tokio runtime until the task is aborted.
    pub fn spawn(mut self) -> JoinHandle<()> {
        info!(
            "Watching {} for catalog changes every {}s",
            self.path.display(),
            self.interval.as_secs()
        );

        tokio::spawn(async move {
            // Baseline read; the server has already applied these settings.
            if let Err(e) = self.reload_once().await {
                debug!("Initial settings read failed: {}", e);
            }

            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match self.reload_once().await {
                    Ok(Some(LoadOutcome::Changed)) => {
                        info!("Tool catalog changed: {}", self.registry.snapshot())
                    }
                    Ok(Some(LoadOutcome::Unchanged)) => {
                        info!("Launch settings updated; tool catalog unchanged")
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Keeping current catalog: {}", e),
                }
            }
        })
    }
}
