//! Catalog domain module.
//!
//! This module resolves launch configuration for the administrator-supplied
//! catalog of CLE tools.
//!
//! ## Architecture
//!
//! - `settings.rs` - Named configuration sources and typed coercion
//! - `snapshot.rs` - One immutable catalog configuration and its defaults
//! - `registry.rs` - The atomically swapped current snapshot and its lookups
//! - `error.rs` - Catalog and settings errors

mod error;
pub mod registry;
pub mod settings;
pub mod snapshot;

pub use error::{CatalogError, CatalogResult, SettingsError};
pub use registry::{Credential, LaunchParameters, LoadOutcome, ToolRegistry};
pub use settings::{EnvSettings, FileSettings, LayeredSettings, SettingsSource};
pub use snapshot::{DEFAULT_TOOL_LIST, RegistrySnapshot};
