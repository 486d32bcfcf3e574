//! Configuration management
//!
//! Settings are resolved in this order of precedence:
//! 1. Environment variables
//! 2. `courier.toml` configuration file
//! 3. Default values
//!
//! `${VAR_NAME}` references inside the configuration file are expanded from
//! the environment before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{Error, Result};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "courier.toml";

/// Telegram Bot API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    #[serde(default, skip_serializing)]
    pub bot_token: String,

    /// Bot API server base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Seconds between two getUpdates polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_api_base_url(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl TelegramConfig {
    /// Create a configuration for the given token with default settings
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            ..Default::default()
        }
    }
}

/// Proxy checker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    /// TCP connect timeout per endpoint, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Maximum number of endpoints checked at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Directory where result files are written before upload
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            concurrency: default_concurrency(),
            output_dir: default_output_dir(),
        }
    }
}

/// Main configuration for courier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Telegram configuration
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Proxy checker configuration
    #[serde(default)]
    pub proxy: ProxyConfig,
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

fn default_concurrency() -> usize {
    64
}

fn default_output_dir() -> String {
    "data/results".to_string()
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl Config {
    /// Expand `${VAR_NAME}` references using `lookup`.
    ///
    /// Unknown variables expand to the empty string. A `$` that is not
    /// followed by `{` is kept as is.
    fn expand_env_vars<F>(value: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Some(env_value) = lookup(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file
    ///
    /// `${VAR_NAME}` references are expanded and environment overrides are
    /// applied on top of the file contents.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut config = Self::parse_toml(&content, env_lookup)?;
        config.apply_overrides(env_lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location
    ///
    /// Uses `./courier.toml` when it exists, environment variables otherwise.
    pub fn load() -> Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_overrides(env_lookup);
        config.validate()?;
        Ok(config)
    }

    fn parse_toml<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = Self::expand_env_vars(content, lookup);
        Ok(toml::from_str(&expanded)?)
    }

    /// Override settings from variables provided by `lookup`
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN").filter(|t| !t.is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(url) = lookup("TELEGRAM_API_BASE_URL").filter(|u| !u.is_empty()) {
            self.telegram.api_base_url = url;
        }
        if let Some(secs) = lookup("TELEGRAM_POLL_INTERVAL_SECS").and_then(|s| s.parse().ok()) {
            self.telegram.poll_interval_secs = secs;
        }
        if let Some(secs) = lookup("TELEGRAM_REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.telegram.request_timeout_secs = secs;
        }

        if let Some(ms) = lookup("PROXY_CONNECT_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.proxy.connect_timeout_ms = ms;
        }
        if let Some(n) = lookup("PROXY_CONCURRENCY").and_then(|s| s.parse().ok()) {
            self.proxy.concurrency = n;
        }
        if let Some(dir) = lookup("PROXY_OUTPUT_DIR").filter(|d| !d.is_empty()) {
            self.proxy.output_dir = dir;
        }
    }

    /// Check that required settings are present
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN not set (telegram.bot_token)".to_string(),
            ));
        }
        if self.telegram.poll_interval_secs == 0 {
            return Err(Error::Config(
                "telegram.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.telegram.request_timeout_secs == 0 {
            return Err(Error::Config(
                "telegram.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.proxy.connect_timeout_ms == 0 {
            return Err(Error::Config(
                "proxy.connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.proxy.concurrency == 0 {
            return Err(Error::Config(
                "proxy.concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
