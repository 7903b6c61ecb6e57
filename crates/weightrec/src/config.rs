//! Configuration management for weightrec.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! connection string has its own lookup chain because it is a secret.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::redact_uri;

/// Environment variable and secrets key holding the connection string.
pub const MONGO_URI_KEY: &str = "MONGO_URI";

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default secrets file name.
const SECRETS_FILE_NAME: &str = "secrets.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "weightrec";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WEIGHTREC_`, nested with `__`)
/// 2. TOML config file at `~/.config/weightrec/config.toml`
/// 3. Default values
///
/// The connection string is then overridden by `MONGO_URI` from the
/// environment, or failing that from the secrets file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,
    /// View configuration.
    pub view: ViewConfig,
}

/// Store-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection string. `MONGO_URI` takes precedence when set.
    pub uri: Option<String>,
    /// Database holding the entry collection.
    pub database: String,
    /// Collection of entry documents.
    pub collection: String,
    /// Path to a secrets TOML file with a top-level `MONGO_URI` key.
    /// Defaults to `~/.config/weightrec/secrets.toml`
    pub secrets_path: Option<PathBuf>,
}

/// View-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Number of entries in the rolling average window.
    pub rolling_window: usize,
    /// Seconds a fetched entry set stays cached.
    pub cache_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: "weight_tracker".to_string(),
            collection: "weights".to_string(),
            secrets_path: None,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            rolling_window: crate::view::DEFAULT_WINDOW,
            cache_ttl_secs: crate::cache::DEFAULT_TTL.as_secs(),
        }
    }
}

/// Shape of the secrets file.
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(rename = "MONGO_URI")]
    mongo_uri: Option<String>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("WEIGHTREC_").split("__"));

        let mut config: Config = figment.extract()?;

        let secrets: Secrets = Figment::from(Toml::file(config.secrets_path())).extract()?;
        let present = |uri: &String| !uri.trim().is_empty();
        let uri = std::env::var(MONGO_URI_KEY)
            .ok()
            .filter(present)
            .or_else(|| secrets.mongo_uri.filter(present));
        if uri.is_some() {
            config.store.uri = uri;
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Get the default secrets file path.
    #[must_use]
    pub fn default_secrets_path() -> PathBuf {
        Self::default_config_dir().join(SECRETS_FILE_NAME)
    }

    fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.store.database.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "store.database must not be empty".to_string(),
            });
        }

        if self.store.collection.trim().is_empty() || self.store.collection.contains('$') {
            return Err(Error::ConfigValidation {
                message: format!(
                    "store.collection must be a non-empty name without '$', got {:?}",
                    self.store.collection
                ),
            });
        }

        if self.view.rolling_window == 0 {
            return Err(Error::ConfigValidation {
                message: "view.rolling_window must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// The connection string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigMissing`] if no source provided one.
    pub fn connection_uri(&self) -> Result<&str> {
        self.store
            .uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .ok_or(Error::ConfigMissing { key: MONGO_URI_KEY })
    }

    /// Get the secrets file path, resolving defaults if not set.
    #[must_use]
    pub fn secrets_path(&self) -> PathBuf {
        self.store
            .secrets_path
            .clone()
            .unwrap_or_else(Self::default_secrets_path)
    }

    /// Get the cache time-to-live as a Duration.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.view.cache_ttl_secs)
    }

    /// A copy safe to print: credentials in the connection string are masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.store.uri = config.store.uri.as_deref().map(redact_uri);
        config
    }
}
