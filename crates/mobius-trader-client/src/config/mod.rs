//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{ClientError, ClientResult};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for one broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default, alias = "brokerId")]
    pub broker_id: u64,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "terminalURL", skip_serializing_if = "Option::is_none")]
    pub terminal_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            broker_id: 0,
            password: String::new(),
            terminal_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        broker_id: u64,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            broker_id,
            password: password.into(),
            ..Default::default()
        }
    }

    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Config(format!("Invalid config {}: {e}", path.display())))
    }

    /// Every field the server connection needs is present.
    pub fn validate(&self) -> ClientResult<()> {
        let mut missing = Vec::new();
        if self.host.is_empty() {
            missing.push("host");
        }
        if self.port == 0 {
            missing.push("port");
        }
        if self.broker_id == 0 {
            missing.push("broker_id");
        }
        if self.password.is_empty() {
            missing.push("password");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Config(format!("missing {}", missing.join(", "))))
        }
    }

    /// Base URL of the JSON-RPC endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

/// Values given explicitly, e.g. on the command line. They win over the
/// environment, which wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub broker_id: Option<u64>,
    pub password: Option<String>,
    pub terminal_url: Option<String>,
}

/// Resolve and validate the client configuration.
pub fn resolve_config(overrides: ConfigOverrides) -> ClientResult<ClientConfig> {
    resolve_config_with(overrides, |key| std::env::var(key).ok())
}

/// [`resolve_config`] with an explicit environment lookup.
pub fn resolve_config_with<F>(overrides: ConfigOverrides, env: F) -> ClientResult<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = overrides
        .config_path
        .clone()
        .or_else(|| env("MT7_CONFIG").map(PathBuf::from));

    let mut config = match path {
        Some(path) => ClientConfig::from_file(&path)?,
        None => ClientConfig::default(),
    };

    if let Some(host) = overrides.host.or_else(|| env("MT7_HOST")) {
        config.host = host;
    }
    let port = match overrides.port {
        Some(port) => Some(port),
        None => parse_env(&env, "MT7_PORT")?,
    };
    if let Some(port) = port {
        config.port = port;
    }
    let broker_id = match overrides.broker_id {
        Some(id) => Some(id),
        None => parse_env(&env, "MT7_BROKER_ID")?,
    };
    if let Some(broker_id) = broker_id {
        config.broker_id = broker_id;
    }
    if let Some(password) = overrides.password.or_else(|| env("MT7_PASSWORD")) {
        config.password = password;
    }
    if let Some(url) = overrides.terminal_url.or_else(|| env("MT7_TERMINAL_URL")) {
        config.terminal_url = Some(url);
    }

    config.validate()?;
    Ok(config)
}

fn parse_env<F, T>(env: &F, key: &str) -> ClientResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{key} is not a valid number: {raw}"))),
        None => Ok(None),
    }
}
