//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the catalog
//! server, including error handling, configuration, settings reloading,
//! server wiring, and the HTTP transport.

pub mod config;
pub mod error;
pub mod reload;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use reload::SettingsWatcher;
pub use server::CatalogServer;
pub use transport::{HttpConfig, HttpTransport};
