//! Process configuration: credentials from the environment plus optional
//! TOML settings.
//!
//! A `.env` file in the working directory is loaded before the environment
//! is read. Each credential has a preferred variable and a legacy fallback.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::store::DEFAULT_TABLE;

/// Search API bearer token (preferred name).
pub const SEARCH_TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";
/// Search API bearer token (legacy name).
pub const SEARCH_TOKEN_LEGACY_VAR: &str = "TWITTER_API_KEY";
/// Record store location (preferred name).
pub const STORE_VAR: &str = "TWEETNET_STORE";
/// Record store location (legacy name).
pub const STORE_LEGACY_VAR: &str = "TWEETNET_STORE_URI";

/// Everything a command needs, built once at process entry.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub credentials: Credentials,
    pub settings: Settings,
}

impl Config {
    /// Load `.env`, read credentials, and load settings from `settings_path`
    /// if given (defaults otherwise).
    pub fn load(settings_path: Option<&Path>) -> ConfigResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let settings = match settings_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Ok(Self {
            credentials: Credentials::from_env(),
            settings,
        })
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Secrets and locations read from the environment.
///
/// Missing values are kept as `None` until a command asks for them, so
/// `verify` runs without a search token.
#[derive(Clone, Default)]
pub struct Credentials {
    search_token: Option<String>,
    store_location: Option<String>,
}

impl Credentials {
    pub fn new(search_token: Option<String>, store_location: Option<String>) -> Self {
        Self {
            search_token,
            store_location,
        }
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |preferred: &str, legacy: &str| {
            lookup(preferred)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| lookup(legacy).filter(|v| !v.trim().is_empty()))
        };
        Self {
            search_token: pick(SEARCH_TOKEN_VAR, SEARCH_TOKEN_LEGACY_VAR),
            store_location: pick(STORE_VAR, STORE_LEGACY_VAR),
        }
    }

    /// Bearer token for the search API.
    pub fn search_token(&self) -> ConfigResult<&str> {
        self.search_token
            .as_deref()
            .ok_or(ConfigError::MissingCredential {
                what: "search API bearer token",
                preferred: SEARCH_TOKEN_VAR,
                legacy: SEARCH_TOKEN_LEGACY_VAR,
            })
    }

    /// Record store location (path or `redb://` URI).
    pub fn store_location(&self) -> ConfigResult<&str> {
        self.store_location
            .as_deref()
            .ok_or(ConfigError::MissingCredential {
                what: "record store location",
                preferred: STORE_VAR,
                legacy: STORE_LEGACY_VAR,
            })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_token", &self.search_token.as_ref().map(|_| "<redacted>"))
            .field("store_location", &self.store_location)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Non-secret tunables, optionally loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the search API.
    pub search_base_url: String,
    /// Per-request network timeout.
    pub request_timeout_secs: u64,
    /// First rate-limit backoff wait.
    pub backoff_initial_secs: u64,
    /// Longest rate-limit backoff wait.
    pub backoff_max_secs: u64,
    /// Store table (collection) holding tweets.
    pub table: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_base_url: "https://api.twitter.com".into(),
            request_timeout_secs: 30,
            backoff_initial_secs: 1,
            backoff_max_secs: 60,
            table: DEFAULT_TABLE.into(),
        }
    }
}

impl Settings {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::SettingsParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values no command can work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.table.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "table",
                message: "must not be empty".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                message: "must be > 0".into(),
            });
        }
        if self.backoff_initial_secs == 0 || self.backoff_initial_secs > self.backoff_max_secs {
            return Err(ConfigError::Invalid {
                key: "backoff_initial_secs",
                message: format!(
                    "must be between 1 and backoff_max_secs ({})",
                    self.backoff_max_secs
                ),
            });
        }
        if !self.search_base_url.starts_with("http://")
            && !self.search_base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                key: "search_base_url",
                message: format!("\"{}\" must start with http:// or https://", self.search_base_url),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_initial(&self) -> Duration {
        Duration::from_secs(self.backoff_initial_secs)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_secs(self.backoff_max_secs)
    }
}
