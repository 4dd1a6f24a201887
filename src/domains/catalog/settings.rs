//! Settings sources and typed coercion.
//!
//! Administrators configure the catalog through named, weakly-typed values
//! (a JSON settings file, environment variables, or anything else that can
//! answer "what is the value called X?"). Every field is read on its own and
//! coerced to the type the snapshot needs. A missing or malformed value falls
//! back to the compiled-in default instead of failing the whole reload.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use super::error::SettingsError;

/// Configuration keys understood by the catalog.
pub mod keys {
    pub const SERVER_URL: &str = "sakai.cle.server.url";
    pub const KEY: &str = "sakai.cle.basiclti.key";
    pub const SECRET: &str = "sakai.cle.basiclti.secret";
    pub const FRAME_HEIGHT: &str = "sakai.cle.basiclti.frame.height";
    pub const FRAME_HEIGHT_LOCK: &str = "sakai.cle.basiclti.frame.height.lock";
    pub const URL_LOCK: &str = "sakai.cle.basiclti.url.lock";
    pub const KEY_LOCK: &str = "sakai.cle.basiclti.key.lock";
    pub const SECRET_LOCK: &str = "sakai.cle.basiclti.secret.lock";
    pub const RELEASE_NAMES: &str = "sakai.cle.basiclti.release.names";
    pub const RELEASE_NAMES_LOCK: &str = "sakai.cle.basiclti.release.names.lock";
    pub const RELEASE_EMAIL: &str = "sakai.cle.basiclti.release.email";
    pub const RELEASE_EMAIL_LOCK: &str = "sakai.cle.basiclti.release.email.lock";
    pub const RELEASE_PRINCIPAL: &str = "sakai.cle.basiclti.release.principal";
    pub const RELEASE_PRINCIPAL_LOCK: &str = "sakai.cle.basiclti.release.principal.lock";
    pub const DEBUG: &str = "sakai.cle.basiclti.debug";
    pub const DEBUG_LOCK: &str = "sakai.cle.basiclti.debug.lock";
    pub const TOOL_LIST: &str = "sakai.cle.basiclti.tool.list";

    /// Every key, in declaration order.
    pub const ALL: [&str; 17] = [
        SERVER_URL,
        KEY,
        SECRET,
        FRAME_HEIGHT,
        FRAME_HEIGHT_LOCK,
        URL_LOCK,
        KEY_LOCK,
        SECRET_LOCK,
        RELEASE_NAMES,
        RELEASE_NAMES_LOCK,
        RELEASE_EMAIL,
        RELEASE_EMAIL_LOCK,
        RELEASE_PRINCIPAL,
        RELEASE_PRINCIPAL_LOCK,
        DEBUG,
        DEBUG_LOCK,
        TOOL_LIST,
    ];
}

/// A source of named configuration values.
pub trait SettingsSource {
    /// Look up the raw value stored under `name`, if any.
    fn get(&self, name: &str) -> Option<Value>;
}

impl SettingsSource for Map<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        Map::get(self, name).cloned()
    }
}

impl SettingsSource for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}

/// Settings read from the process environment.
///
/// `sakai.cle.server.url` is looked up as `SAKAI_CLE_SERVER_URL`. All values
/// arrive as strings and go through the same coercion as file values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl EnvSettings {
    /// The environment variable that carries `name`.
    pub fn var_name(name: &str) -> String {
        name.replace('.', "_").to_uppercase()
    }

    /// Catalog keys that currently have an environment override.
    pub fn present() -> Vec<&'static str> {
        keys::ALL
            .into_iter()
            .filter(|name| std::env::var_os(Self::var_name(name)).is_some())
            .collect()
    }
}

impl SettingsSource for EnvSettings {
    fn get(&self, name: &str) -> Option<Value> {
        std::env::var(Self::var_name(name)).ok().map(Value::String)
    }
}

/// Several sources queried in order; the first one holding a name wins.
#[derive(Default)]
pub struct LayeredSettings<'a> {
    layers: Vec<&'a dyn SettingsSource>,
}

impl<'a> LayeredSettings<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a layer with lower precedence than every layer added before it.
    pub fn with(mut self, layer: &'a dyn SettingsSource) -> Self {
        self.layers.push(layer);
        self
    }
}

impl SettingsSource for LayeredSettings<'_> {
    fn get(&self, name: &str) -> Option<Value> {
        self.layers.iter().find_map(|layer| layer.get(name))
    }
}

/// Settings stored as a JSON object keyed by configuration name.
pub struct FileSettings;

impl FileSettings {
    /// Read and parse a settings file.
    pub fn read(path: &Path) -> Result<Map<String, Value>, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse the contents of a settings file already read from `path`.
    pub fn parse(path: &Path, contents: &str) -> Result<Map<String, Value>, SettingsError> {
        let value: Value = serde_json::from_str(contents).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(SettingsError::NotAnObject(path.to_path_buf())),
        }
    }
}

fn fallback<T: std::fmt::Debug>(name: &str, raw: &Value, default: T) -> T {
    debug!("Ignoring malformed value for {}: {} (using {:?})", name, raw, default);
    default
}

/// Read a string setting.
pub fn string(source: &dyn SettingsSource, name: &str, default: &str) -> String {
    match source.get(name) {
        None => default.to_string(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => fallback(name, &other, default.to_string()),
    }
}

/// Read an integer setting.
pub fn long(source: &dyn SettingsSource, name: &str, default: i64) -> i64 {
    match source.get(name) {
        None => default,
        Some(raw) => {
            let parsed = match &raw {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            parsed.unwrap_or_else(|| fallback(name, &raw, default))
        }
    }
}

/// Read a boolean setting.
///
/// Strings are accepted when they spell `true` or `false` in any case.
pub fn boolean(source: &dyn SettingsSource, name: &str, default: bool) -> bool {
    match source.get(name) {
        None => default,
        Some(raw) => {
            let parsed = match &raw {
                Value::Bool(b) => Some(*b),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                },
                _ => None,
            };
            parsed.unwrap_or_else(|| fallback(name, &raw, default))
        }
    }
}

/// Read a list of strings.
///
/// A JSON array yields its scalar elements (nulls skipped). A plain string is
/// split on commas, which is how lists travel through environment variables.
pub fn string_list(source: &dyn SettingsSource, name: &str, default: &[&str]) -> Vec<String> {
    let owned_default = || default.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    match source.get(name) {
        None => owned_default(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => {
            let mut list = Vec::with_capacity(items.len());
            for item in &items {
                match item {
                    Value::Null => {}
                    Value::String(s) => list.push(s.clone()),
                    Value::Number(n) => list.push(n.to_string()),
                    Value::Bool(b) => list.push(b.to_string()),
                    _ => return fallback(name, &Value::Array(items.clone()), owned_default()),
                }
            }
            list
        }
        Some(other) => fallback(name, &other, owned_default()),
    }
}
