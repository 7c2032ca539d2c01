//! Configuration management with TOML, environment variables, and CLI overrides.
//!
//! The [`Config`] is built once in `main` and handed to the client, notifier
//! and tracker constructors. Nothing below this module reads the environment.

use crate::amazon::regions::Region;
use crate::error::TrackerError;
use crate::tracker::BaselinePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storefront assumed for product URLs on unrecognised hosts
    #[serde(default)]
    pub region: Region,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Base delay before each product request in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Product catalog (JSON array of {id, name, url})
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Baseline price state file
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// What to store when the price did not drop
    #[serde(default)]
    pub baseline_policy: BaselinePolicy,

    /// Minimum relative drop, in percent, worth an alert
    #[serde(default)]
    pub drop_threshold_percent: f64,

    /// Report output format
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Telegram bot identity and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Channel or chat the alerts go to (e.g. "@deals" or "-100123...")
    #[serde(default)]
    pub chat_id: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Validated Telegram identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("products.json")
}

fn default_state_path() -> PathBuf {
    PathBuf::from("prices.json")
}

fn default_api_base() -> String {
    DEFAULT_TELEGRAM_API.to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { bot_token: None, chat_id: None, api_base: default_api_base() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: Region::Us,
            proxy: None,
            timeout_secs: default_timeout_secs(),
            delay_ms: 0,
            delay_jitter_ms: 0,
            catalog_path: default_catalog_path(),
            state_path: default_state_path(),
            baseline_policy: BaselinePolicy::Ratchet,
            drop_threshold_percent: 0.0,
            format: OutputFormat::Text,
            telegram: TelegramConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Rejects settings that would silently disable alerting.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.drop_threshold_percent;
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            anyhow::bail!(
                "drop_threshold_percent must be between 0 and 100, got {}",
                threshold
            );
        }
        Ok(())
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
            let xdg_config = config_dir.join("amz-price-alert").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(self) -> Self {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable source.
    ///
    /// Unparseable numeric or region values are ignored.
    pub fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = var("BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }

        if let Some(chat) = var("CHANNEL_ID") {
            self.telegram.chat_id = Some(chat);
        }

        if let Some(r) = var("AMZ_REGION").and_then(|v| v.parse().ok()) {
            self.region = r;
        }

        if let Some(proxy) = var("AMZ_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Some(d) = var("AMZ_DELAY").and_then(|v| v.parse().ok()) {
            self.delay_ms = d;
        }

        if let Some(path) = var("AMZ_CATALOG") {
            self.catalog_path = PathBuf::from(path);
        }

        if let Some(path) = var("AMZ_STATE") {
            self.state_path = PathBuf::from(path);
        }

        self
    }

    /// Returns the bot token and chat id, refusing blank or absent values.
    pub fn telegram_credentials(&self) -> Result<Credentials, TrackerError> {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
        }

        let bot_token = present(&self.telegram.bot_token)
            .ok_or(TrackerError::MissingCredentials("BOT_TOKEN"))?;
        let chat_id =
            present(&self.telegram.chat_id).ok_or(TrackerError::MissingCredentials("CHANNEL_ID"))?;

        Ok(Credentials { bot_token, chat_id })
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
