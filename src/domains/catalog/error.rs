//! Catalog-specific error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for catalog lookups.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while querying the tool catalog.
///
/// An unrecognized tool is not an error: lookups return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The caller passed an unusable tool identifier.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The tool listing could not be encoded.
    #[error("{0}")]
    Encoding(#[from] serde_json::Error),
}

impl CatalogError {
    /// Create a new "invalid argument" error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Errors that can occur while reading a settings file.
///
/// Individual malformed fields never produce an error; only a file that
/// cannot be read as a whole does.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Cannot read settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON.
    #[error("Invalid JSON in settings file '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The settings file is valid JSON but not an object.
    #[error("Settings file '{0}' must contain a JSON object")]
    NotAnObject(PathBuf),
}
