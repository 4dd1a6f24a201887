//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path of the tool list endpoint.
    #[serde(default = "default_tools_path")]
    pub tools_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_tools_path() -> String {
    "/var/basiclti/cletools".to_string()
}

fn default_cors() -> bool {
    true
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: default_host(),
            tools_path: default_tools_path(),
            enable_cors: default_cors(),
        }
    }
}

impl HttpConfig {
    /// Create an HTTP transport config.
    pub fn new(port: u16, host: impl Into<String>) -> Self {
        Self {
            port,
            host: host.into(),
            ..Default::default()
        }
    }

    /// Load HTTP config from environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("CLE_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let host = std::env::var("CLE_HTTP_HOST").unwrap_or_else(|_| default_host());
        let tools_path = std::env::var("CLE_HTTP_PATH").unwrap_or_else(|_| default_tools_path());
        let enable_cors = std::env::var("CLE_HTTP_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Self {
            port,
            host,
            tools_path,
            enable_cors,
        }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        format!("HTTP on {}{}", self.address(), self.tools_path)
    }
}
