//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::api::{ClientSettings, Credentials};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint URL
    #[serde(default)]
    pub endpoint: String,

    /// Access key and secret key
    #[serde(flatten)]
    pub credentials: Credentials,

    /// Display name of the account
    #[serde(default = "default_name")]
    pub name: String,

    /// Only allow Get/List/Describe actions
    #[serde(default)]
    pub read_only: bool,

    /// Log every normalized response
    #[serde(default)]
    pub debug: bool,

    /// Request timeout in seconds (0 = transport default)
    #[serde(default)]
    pub timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_name() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            credentials: Credentials::default(),
            name: default_name(),
            read_only: false,
            debug: false,
            timeout_secs: 0,
            proxy: None,
            format: OutputFormat::Json,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("cloud-query").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("CLOUD_QUERY_ENDPOINT") {
            self.endpoint = endpoint;
        }

        if let Ok(access_key) = std::env::var("CLOUD_QUERY_ACCESS_KEY") {
            self.credentials.access_key = access_key;
        }

        if let Ok(secret_key) = std::env::var("CLOUD_QUERY_SECRET_KEY") {
            self.credentials.secret_key = secret_key;
        }

        if let Ok(proxy) = std::env::var("CLOUD_QUERY_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(read_only) = std::env::var("CLOUD_QUERY_READ_ONLY") {
            match read_only.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.read_only = true,
                "0" | "false" | "no" => self.read_only = false,
                _ => {}
            }
        }

        self
    }

    /// Checks that everything needed to sign a request is present.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            anyhow::bail!("No endpoint configured. Use --endpoint or CLOUD_QUERY_ENDPOINT.");
        }
        if self.credentials.access_key.is_empty() || self.credentials.secret_key.is_empty() {
            anyhow::bail!(
                "Missing credentials. Use --access-key/--secret-key or CLOUD_QUERY_ACCESS_KEY/CLOUD_QUERY_SECRET_KEY."
            );
        }
        Ok(())
    }

    /// Connection settings for the query client.
    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.endpoint.clone(),
            read_only: self.read_only,
            debug: self.debug,
            timeout: Duration::from_secs(self.timeout_secs),
            proxy: self.proxy.clone(),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Compact,
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "pretty" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!("Unknown format: {}. Use: json, compact, table", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Compact => write!(f, "compact"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}
