//! Tool Registry - the current catalog snapshot and the lookups against it.
//!
//! The registry holds an `Arc<RegistrySnapshot>` behind a read-write lock.
//! Readers clone the `Arc` and release the lock before doing any work, so a
//! query always runs against exactly one snapshot. Reconfiguration builds the
//! replacement outside the lock and only takes the write lock for the swap.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{CatalogError, CatalogResult};
use super::settings::SettingsSource;
use super::snapshot::RegistrySnapshot;

/// Non-secret values needed to launch a recognized tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParameters {
    #[serde(rename = "ltiurl")]
    pub url: String,
    #[serde(rename = "ltiurl_lock")]
    pub url_lock: bool,
    #[serde(rename = "ltikey_lock")]
    pub key_lock: bool,
    #[serde(rename = "ltisecret_lock")]
    pub secret_lock: bool,
    pub frame_height: i64,
    pub frame_height_lock: bool,
    pub release_names: bool,
    pub release_names_lock: bool,
    pub release_email: bool,
    pub release_email_lock: bool,
    #[serde(rename = "release_principal_name")]
    pub release_principal: bool,
    #[serde(rename = "release_principal_name_lock")]
    pub release_principal_lock: bool,
    pub debug: bool,
    pub debug_lock: bool,
}

/// Key and secret used to sign a tool launch.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "ltikey")]
    pub key: String,
    #[serde(rename = "ltisecret")]
    pub secret: String,
}

/// Custom Debug implementation to redact the secret from logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// What a reload did to the catalog's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Server URL, credential and tool list are unchanged.
    Unchanged,
    /// At least one of server URL, credential or tool list changed.
    Changed,
}

/// The process-wide catalog of recognized tools.
pub struct ToolRegistry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(RegistrySnapshot::default())
    }
}

impl ToolRegistry {
    /// Create a registry serving `snapshot`.
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Create a registry from a settings source.
    pub fn from_settings(source: &dyn SettingsSource) -> Self {
        Self::new(RegistrySnapshot::from_settings(source))
    }

    /// Rebuild the whole snapshot from `source` and swap it in.
    ///
    /// Never fails: malformed fields take their defaults.
    pub fn load(&self, source: &dyn SettingsSource) -> LoadOutcome {
        let outcome = self.replace(RegistrySnapshot::from_settings(source));
        info!("Tool catalog reloaded ({:?})", outcome);
        outcome
    }

    /// Install an already built snapshot.
    pub fn replace(&self, snapshot: RegistrySnapshot) -> LoadOutcome {
        let next = Arc::new(snapshot);
        let previous = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, next.clone())
        };

        if *previous == *next {
            LoadOutcome::Unchanged
        } else {
            debug!("Catalog identity changed: {} -> {}", previous, next);
            LoadOutcome::Changed
        }
    }

    /// The snapshot currently being served.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recognized tool identifiers, in configuration order.
    pub fn list_recognized_tools(&self) -> Vec<String> {
        debug!("list_recognized_tools()");
        self.snapshot().tools().to_vec()
    }

    /// Launch parameters for `id`, or `None` if the tool is not recognized.
    pub fn resolve_launch_parameters(&self, id: &str) -> CatalogResult<Option<LaunchParameters>> {
        debug!("resolve_launch_parameters({})", id);
        let snapshot = self.recognized(id)?;

        Ok(snapshot.map(|s| LaunchParameters {
            url: s.launch_url(id),
            url_lock: s.url_lock,
            key_lock: s.key_lock,
            secret_lock: s.secret_lock,
            frame_height: s.frame_height,
            frame_height_lock: s.frame_height_lock,
            release_names: s.release_names,
            release_names_lock: s.release_names_lock,
            release_email: s.release_email,
            release_email_lock: s.release_email_lock,
            release_principal: s.release_principal,
            release_principal_lock: s.release_principal_lock,
            debug: s.debug,
            debug_lock: s.debug_lock,
        }))
    }

    /// Key and secret for `id`, or `None` if the tool is not recognized.
    ///
    /// Every recognized tool shares the same credential.
    pub fn resolve_credential(&self, id: &str) -> CatalogResult<Option<Credential>> {
        debug!("resolve_credential({})", id);
        let snapshot = self.recognized(id)?;

        Ok(snapshot.map(|s| Credential {
            key: s.key.clone(),
            secret: s.secret.clone(),
        }))
    }

    /// The current snapshot if it recognizes `id`.
    fn recognized(&self, id: &str) -> CatalogResult<Option<Arc<RegistrySnapshot>>> {
        if id.is_empty() {
            return Err(CatalogError::invalid_argument("tool identifier must not be empty"));
        }

        let snapshot = self.snapshot();
        Ok(snapshot.recognizes(id).then_some(snapshot))
    }
}

impl PartialEq for ToolRegistry {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || *self.snapshot() == *other.snapshot()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("current", &self.snapshot())
            .finish()
    }
}
