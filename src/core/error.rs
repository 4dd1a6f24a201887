//! Error types and handling for the catalog server.
//!
//! This module defines a unified error type that can represent errors from
//! the settings source and configuration checks.

use thiserror::Error;

use crate::domains::catalog::SettingsError;

/// A specialized Result type for catalog server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the catalog server.
#[derive(Debug, Error)]
pub enum Error {
    /// A settings file could not be read.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
