//! Transport layer for the catalog server.
//!
//! The catalog is published over HTTP: a single read-only endpoint returning
//! the recognized tool list as JSON, plus a health check. The transport only
//! reads from the shared registry handed to it by [`crate::core::CatalogServer`].

mod config;
mod error;
pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
