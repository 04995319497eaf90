//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Environment variable that overrides the configured base URL
pub const BASE_URL_ENV_VAR: &str = "EXPENSE_E2E_BASE_URL";

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root URL of the expense API, including any path prefix
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Built-in journey settings
    #[serde(default)]
    pub journey: JourneyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeouts: Timeouts::default(),
            journey: JourneyConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Timeouts {
    /// Whole-request timeout, including reading the body
    #[serde(default = "default_request")]
    pub request_secs: u64,

    /// TCP connect timeout
    #[serde(default = "default_connect")]
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request(),
            connect_secs: default_connect(),
        }
    }
}

impl Timeouts {
    /// A zero timeout would fail every request, so both must be positive
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("request_secs", self.request_secs),
            ("connect_secs", self.connect_secs),
        ] {
            if secs == 0 {
                return Err(Error::Config(format!(
                    "timeouts.{} must be at least 1 second",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn default_request() -> u64 {
    30
}
fn default_connect() -> u64 {
    10
}

/// Settings for the built-in expense journey
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct JourneyConfig {
    /// Append a read after the delete step that expects 404
    #[serde(default = "default_verify_deletion")]
    pub verify_deletion: bool,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            verify_deletion: default_verify_deletion(),
        }
    }
}

fn default_verify_deletion() -> bool {
    true
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.timeouts.validate()?;
        Ok(config)
    }

    /// Apply `EXPENSE_E2E_BASE_URL` from the process environment
    pub fn apply_env(&mut self) {
        self.apply_base_url_override(std::env::var(BASE_URL_ENV_VAR).ok());
    }

    /// Replace the base URL when the override is present and non-blank
    pub fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(value) = value {
            if !value.trim().is_empty() {
                self.base_url = value.trim().to_string();
            }
        }
    }

    /// The validated base URL, without a trailing slash
    pub fn base_url(&self) -> Result<String> {
        normalize_base_url(&self.base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.request_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.connect_secs)
    }
}

/// Validate a base URL and trim trailing slashes
///
/// Only absolute `http`/`https` URLs are accepted.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::Config(format!(
                "Unsupported base URL scheme '{}'. Use http or https",
                other
            )))
        }
    }

    if parsed.host_str().is_none() {
        return Err(Error::Config(format!("Base URL '{}' has no host", trimmed)));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
