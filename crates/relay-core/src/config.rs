use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// How long a blocked red-envelope text stays suppressed.
pub const DEFAULT_SUPPRESS_WINDOW_MS: u64 = 300_000;
/// Sender id QQ uses for "app messages" (system notices).
pub const DEFAULT_SYSTEM_SENDER: &str = "1000000";
/// Platform that answers the IRC query commands.
pub const DEFAULT_REQUEST_TARGET: &str = "IRC";
/// Commands forwarded to [`DEFAULT_REQUEST_TARGET`] as requests.
pub const DEFAULT_COMMANDS: &[&str] = &["/ircnames", "/ircwhois", "/irctopic", "/irccommand"];

/// Top-level config (relay.toml + RELAY_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub options: OptionsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Drop the `[nick]` prefix from every relayed message.
    #[serde(default)]
    pub hidenick: bool,
    #[serde(default, rename = "QQ", alias = "qq")]
    pub qq: QqConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QqConfig {
    /// Missing table means every notification is off.
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default = "default_system_sender")]
    pub system_sender: String,
    #[serde(default = "default_suppress_window_ms")]
    pub suppress_window_ms: u64,
    #[serde(default = "default_commands")]
    pub commands: Vec<String>,
    #[serde(default = "default_request_target")]
    pub request_target: String,
}

impl Default for QqConfig {
    fn default() -> Self {
        Self {
            notify: NotifyConfig::default(),
            system_sender: default_system_sender(),
            suppress_window_ms: default_suppress_window_ms(),
            commands: default_commands(),
            request_target: default_request_target(),
        }
    }
}

/// Which QQ-side events are announced to the other platforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub sysmessage: bool,
    #[serde(default)]
    pub join: bool,
    #[serde(default)]
    pub leave: bool,
    #[serde(default)]
    pub setadmin: bool,
}

fn default_system_sender() -> String {
    DEFAULT_SYSTEM_SENDER.to_string()
}
fn default_suppress_window_ms() -> u64 {
    DEFAULT_SUPPRESS_WINDOW_MS
}
fn default_commands() -> Vec<String> {
    DEFAULT_COMMANDS.iter().map(|c| c.to_string()).collect()
}
fn default_request_target() -> String {
    DEFAULT_REQUEST_TARGET.to_string()
}

impl RelayConfig {
    /// Load config from a TOML file with RELAY_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.relay/relay.toml
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(Figment::new().merge(Toml::file(&path)))
    }

    /// Parse an in-memory TOML document (env overrides still apply).
    pub fn from_toml_str(toml: &str) -> crate::error::Result<Self> {
        Self::from_figment(Figment::new().merge(Toml::string(toml)))
    }

    fn from_figment(figment: Figment) -> crate::error::Result<Self> {
        figment
            .merge(Env::prefixed("RELAY_").split("__"))
            .extract()
            .map_err(|e| crate::error::RelayError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.relay/relay.toml", home)
}
