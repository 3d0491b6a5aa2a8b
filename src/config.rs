//! Configuration file parser for ~/.config/topic-desk/config.toml.
//!
//! The config file is optional and a missing file yields `Config::default()`.
//! Unknown keys are ignored, but logged as warnings since they are usually
//! typos.
use crate::picker::PickerSettings;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable consulted for the API token.
pub const TOKEN_ENV_VAR: &str = "TOPIC_DESK_API_TOKEN";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration. Any subset of keys may be given.
///
/// `Debug` masks `api_token`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root, e.g. `https://admin.example.com/api`.
    pub base_url: String,

    /// Bearer token. The env var and `--token` take precedence.
    pub api_token: Option<String>,

    pub request_timeout_secs: u64,

    /// How long a toast stays visible.
    pub toast_duration_ms: u64,

    /// Selected related topics shown before collapsing.
    pub picker_items_show_limit: usize,

    pub picker_allow_search_filter: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            toast_duration_ms: 2000,
            picker_items_show_limit: 100,
            picker_allow_search_filter: true,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("toast_duration_ms", &self.toast_duration_ms)
            .field("picker_items_show_limit", &self.picker_items_show_limit)
            .field("picker_allow_search_filter", &self.picker_allow_search_filter)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "base_url",
        "api_token",
        "request_timeout_secs",
        "toast_duration_ms",
        "picker_items_show_limit",
        "picker_allow_search_filter",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse TOML text; blank text gives the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn picker_settings(&self) -> PickerSettings {
        PickerSettings {
            items_show_limit: self.picker_items_show_limit,
            allow_search_filter: self.picker_allow_search_filter,
            ..PickerSettings::default()
        }
    }

    /// Pick the token by precedence: flag, then env var, then file.
    /// Blank values are skipped.
    pub fn resolve_token(&self, flag: Option<&str>, env: Option<&str>) -> Option<SecretString> {
        [flag, env, self.api_token.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(|t| SecretString::from(t.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
