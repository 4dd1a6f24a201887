//! CLE Tool Catalog Server Entry Point
//!
//! Initializes logging, loads configuration, builds the tool registry, starts
//! the settings watcher and serves the catalog over HTTP.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use cle_tools::core::{CatalogServer, Config, HttpTransport, SettingsWatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config.logging.level);

    config.validate()?;

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = CatalogServer::new(config.clone());

    let watcher = SettingsWatcher::new(&config.catalog, server.registry().clone())
        .map(SettingsWatcher::spawn);

    info!("Starting transport: {}", config.transport.description());
    let result = HttpTransport::new(config.transport).run(server).await;

    if let Some(handle) = watcher {
        handle.abort();
    }
    result?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
