//! Immutable catalog configuration.
//!
//! A [`RegistrySnapshot`] is built in one go from a settings source and never
//! changes afterwards. Reconfiguration builds a new one.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::settings::{self, SettingsSource, keys};

pub const DEFAULT_SERVER_URL: &str = "http://localhost";
pub const DEFAULT_KEY: &str = "12345";
pub const DEFAULT_SECRET: &str = "secret";
pub const DEFAULT_FRAME_HEIGHT: i64 = 100;

/// Path segment between the server URL and the tool identifier.
pub const PROVIDER_PATH: &str = "/imsblti/provider/";

/// Tools published when the deployment does not supply its own list.
pub const DEFAULT_TOOL_LIST: [&str; 24] = [
    "sakai.gradebook.gwt.rpc",
    "sakai.assignment.grades",
    "sakai.samigo",
    "sakai.schedule",
    "sakai.announcements",
    "sakai.postem",
    "sakai.profile2",
    "sakai.profile",
    "sakai.chat",
    "sakai.resources",
    "sakai.rwiki",
    "sakai.forums",
    "sakai.gradebook.tool",
    "sakai.mailbox",
    "sakai.singleuser",
    "sakai.messages",
    "sakai.site.roster",
    "sakai.news",
    "sakai.summary.calendar",
    "sakai.poll",
    "sakai.syllabus",
    "sakai.blogwow",
    "sakai.sitestats",
    "sakai.sections",
];

/// One complete catalog configuration.
///
/// Equality and hashing only consider the server URL, the key, the secret
/// and the ordered tool list. Display flags and locks are ignored, so two
/// snapshots that differ only in, say, frame height compare equal.
#[derive(Clone)]
pub struct RegistrySnapshot {
    pub base_url: String,
    pub key: String,
    pub secret: String,
    pub frame_height: i64,
    pub frame_height_lock: bool,
    pub url_lock: bool,
    pub key_lock: bool,
    pub secret_lock: bool,
    pub release_names: bool,
    pub release_names_lock: bool,
    pub release_email: bool,
    pub release_email_lock: bool,
    pub release_principal: bool,
    pub release_principal_lock: bool,
    pub debug: bool,
    pub debug_lock: bool,
    tools: Vec<String>,
    index: HashSet<String>,
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            key: DEFAULT_KEY.to_string(),
            secret: DEFAULT_SECRET.to_string(),
            frame_height: DEFAULT_FRAME_HEIGHT,
            frame_height_lock: true,
            url_lock: true,
            key_lock: true,
            secret_lock: true,
            release_names: true,
            release_names_lock: true,
            release_email: true,
            release_email_lock: true,
            release_principal: true,
            release_principal_lock: true,
            debug: false,
            debug_lock: true,
            tools: Vec::new(),
            index: HashSet::new(),
        }
        .with_tools(DEFAULT_TOOL_LIST)
    }
}

impl RegistrySnapshot {
    /// Build a snapshot from a settings source.
    ///
    /// Each field is read independently; anything missing or malformed takes
    /// its default. Nothing is carried over from an earlier snapshot.
    pub fn from_settings(source: &dyn SettingsSource) -> Self {
        let d = Self::default();

        let mut frame_height = settings::long(source, keys::FRAME_HEIGHT, d.frame_height);
        if frame_height <= 0 {
            tracing::debug!("Ignoring non-positive frame height {}", frame_height);
            frame_height = d.frame_height;
        }

        let tools = settings::string_list(source, keys::TOOL_LIST, &DEFAULT_TOOL_LIST);

        Self {
            base_url: settings::string(source, keys::SERVER_URL, &d.base_url),
            key: settings::string(source, keys::KEY, &d.key),
            secret: settings::string(source, keys::SECRET, &d.secret),
            frame_height,
            frame_height_lock: settings::boolean(
                source,
                keys::FRAME_HEIGHT_LOCK,
                d.frame_height_lock,
            ),
            url_lock: settings::boolean(source, keys::URL_LOCK, d.url_lock),
            key_lock: settings::boolean(source, keys::KEY_LOCK, d.key_lock),
            secret_lock: settings::boolean(source, keys::SECRET_LOCK, d.secret_lock),
            release_names: settings::boolean(source, keys::RELEASE_NAMES, d.release_names),
            release_names_lock: settings::boolean(
                source,
                keys::RELEASE_NAMES_LOCK,
                d.release_names_lock,
            ),
            release_email: settings::boolean(source, keys::RELEASE_EMAIL, d.release_email),
            release_email_lock: settings::boolean(
                source,
                keys::RELEASE_EMAIL_LOCK,
                d.release_email_lock,
            ),
            release_principal: settings::boolean(
                source,
                keys::RELEASE_PRINCIPAL,
                d.release_principal,
            ),
            release_principal_lock: settings::boolean(
                source,
                keys::RELEASE_PRINCIPAL_LOCK,
                d.release_principal_lock,
            ),
            debug: settings::boolean(source, keys::DEBUG, d.debug),
            debug_lock: settings::boolean(source, keys::DEBUG_LOCK, d.debug_lock),
            tools: Vec::new(),
            index: HashSet::new(),
        }
        .with_tools(tools)
    }

    /// Replace the tool list. The list is kept exactly as given.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self.index = self.tools.iter().cloned().collect();
        self
    }

    /// Recognized tool identifiers, in configuration order.
    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// Whether `id` names a recognized tool.
    pub fn recognizes(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Launch URL for a tool.
    pub fn launch_url(&self, id: &str) -> String {
        format!("{}{}{}", self.base_url, PROVIDER_PATH, id)
    }
}

impl PartialEq for RegistrySnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url
            && self.key == other.key
            && self.secret == other.secret
            && self.tools == other.tools
    }
}

impl Eq for RegistrySnapshot {}

impl Hash for RegistrySnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_url.hash(state);
        self.key.hash(state);
        self.secret.hash(state);
        self.tools.hash(state);
    }
}

/// Custom Debug implementation to redact the shared secret from logs.
impl fmt::Debug for RegistrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrySnapshot")
            .field("base_url", &self.base_url)
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .field("frame_height", &self.frame_height)
            .field("debug", &self.debug)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RegistrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistrySnapshot [tools={:?}, base_url={}]", self.tools, self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn settings(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let snapshot = RegistrySnapshot::from_settings(&Map::new());

        assert_eq!(snapshot.base_url, "http://localhost");
        assert_eq!(snapshot.key, "12345");
        assert_eq!(snapshot.secret, "secret");
        assert_eq!(snapshot.frame_height, 100);
        assert!(snapshot.frame_height_lock);
        assert!(snapshot.url_lock && snapshot.key_lock && snapshot.secret_lock);
        assert!(snapshot.release_names && snapshot.release_names_lock);
        assert!(snapshot.release_email && snapshot.release_email_lock);
        assert!(snapshot.release_principal && snapshot.release_principal_lock);
        assert!(!snapshot.debug);
        assert!(snapshot.debug_lock);
        assert_eq!(snapshot.tools().len(), 24);
        assert_eq!(
            snapshot.tools().first().map(String::as_str),
            Some("sakai.gradebook.gwt.rpc")
        );
        assert_eq!(snapshot.tools().last().map(String::as_str), Some("sakai.sections"));
    }

    #[test]
    fn test_supplied_values_override_defaults() {
        let snapshot = RegistrySnapshot::from_settings(&settings(&[
            (keys::SERVER_URL, json!("https://cle.example.edu")),
            (keys::KEY, json!("k")),
            (keys::SECRET, json!("s")),
            (keys::FRAME_HEIGHT, json!(640)),
            (keys::DEBUG, json!(true)),
            (keys::URL_LOCK, json!("false")),
            (keys::TOOL_LIST, json!(["sakai.poll", "sakai.chat"])),
        ]));

        assert_eq!(snapshot.base_url, "https://cle.example.edu");
        assert_eq!(snapshot.key, "k");
        assert_eq!(snapshot.secret, "s");
        assert_eq!(snapshot.frame_height, 640);
        assert!(snapshot.debug);
        assert!(!snapshot.url_lock);
        assert!(snapshot.key_lock);
        assert_eq!(snapshot.tools(), ["sakai.poll", "sakai.chat"]);
    }

    #[test]
    fn test_malformed_fields_fall_back_individually() {
        let snapshot = RegistrySnapshot::from_settings(&settings(&[
            (keys::SERVER_URL, json!({ "nested": true })),
            (keys::KEY, json!("kept")),
            (keys::FRAME_HEIGHT, json!("very tall")),
            (keys::DEBUG, json!("maybe")),
            (keys::TOOL_LIST, json!(12)),
        ]));

        assert_eq!(snapshot.base_url, DEFAULT_SERVER_URL);
        assert_eq!(snapshot.key, "kept");
        assert_eq!(snapshot.frame_height, DEFAULT_FRAME_HEIGHT);
        assert!(!snapshot.debug);
        assert_eq!(snapshot.tools().len(), DEFAULT_TOOL_LIST.len());
    }

    #[test]
    fn test_non_positive_frame_height_uses_default() {
        let snapshot = RegistrySnapshot::from_settings(&settings(&[(keys::FRAME_HEIGHT, json!(0))]));
        assert_eq!(snapshot.frame_height, DEFAULT_FRAME_HEIGHT);
    }

    #[test]
    fn test_tool_list_kept_verbatim() {
        let snapshot = RegistrySnapshot::from_settings(&settings(&[(
            keys::TOOL_LIST,
            json!(["sakai.chat", "sakai.poll", "sakai.chat"]),
        )]));
        assert_eq!(snapshot.tools(), ["sakai.chat", "sakai.poll", "sakai.chat"]);
        assert!(snapshot.recognizes("sakai.poll"));
        assert!(!snapshot.recognizes("sakai.news"));

        let deduped = RegistrySnapshot::default().with_tools(["sakai.chat", "sakai.poll"]);
        assert_ne!(snapshot, deduped);
    }

    #[test]
    fn test_equality_ignores_display_fields() {
        let a = RegistrySnapshot::from_settings(&settings(&[(keys::FRAME_HEIGHT, json!(100))]));
        let b = RegistrySnapshot::from_settings(&settings(&[
            (keys::FRAME_HEIGHT, json!(480)),
            (keys::DEBUG, json!(true)),
            (keys::RELEASE_EMAIL, json!(false)),
        ]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = RegistrySnapshot::default().with_tools(["sakai.chat", "sakai.poll"]);
        let b = RegistrySnapshot::default().with_tools(["sakai.poll", "sakai.chat"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_covers_credentials() {
        let a = RegistrySnapshot::default();
        let mut b = RegistrySnapshot::default();
        b.secret = "rotated".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut snapshot = RegistrySnapshot::default();
        snapshot.secret = "super_secret_value".to_string();
        let debug_str = format!("{:?}", snapshot);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_value"));
    }

    #[test]
    fn test_launch_url() {
        let snapshot = RegistrySnapshot::default();
        assert_eq!(
            snapshot.launch_url("sakai.chat"),
            "http://localhost/imsblti/provider/sakai.chat"
        );
    }
}
