//! CLE Tool Catalog Library
//!
//! This crate resolves launch configuration for an administrator-supplied
//! catalog of Sakai CLE tools and publishes the catalog over HTTP.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, server wiring, settings
//!   reloading and the HTTP transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **catalog**: settings coercion, catalog snapshots and the tool registry
//!
//! # Example
//!
//! ```rust
//! use cle_tools::domains::catalog::ToolRegistry;
//!
//! let registry = ToolRegistry::default();
//! let launch = registry.resolve_launch_parameters("sakai.chat").unwrap().unwrap();
//! assert_eq!(launch.url, "http://localhost/imsblti/provider/sakai.chat");
//! assert!(registry.resolve_credential("not.a.tool").unwrap().is_none());
//! ```

pub mod core;
pub mod domains;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    pub static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());
}

// Re-export commonly used types for convenience
pub use core::{CatalogServer, Config, Error, Result};
pub use domains::catalog::ToolRegistry;
