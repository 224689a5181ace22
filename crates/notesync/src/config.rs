//! Configuration management for notesync.
//!
//! Configuration is layered with figment. From lowest to highest precedence:
//! 1. Defaults
//! 2. TOML file at `~/.config/notesync/config.toml`
//! 3. `SUPABASE_URL` / `SUPABASE_KEY`
//! 4. Environment variables prefixed with `NOTESYNC_`, using `__` to nest
//!    (`NOTESYNC_REMOTE__URL`)
//!
//! Remote mode is selected solely by the joint presence of `remote.url` and
//! `remote.key`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::local::DEFAULT_SLOT_KEY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "notesync";

/// Default slot database file name.
const SLOT_FILE_NAME: &str = "notes.db";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local slot storage.
    pub storage: StorageConfig,
    /// Remote table.
    pub remote: RemoteConfig,
}

/// Local slot storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the slot database.
    /// Defaults to `~/.local/share/notesync/notes.db`
    pub slot_path: Option<PathBuf>,
    /// Name of the slot holding the note collection.
    pub slot_key: String,
}

/// Remote table configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the PostgREST service (e.g. `https://<project>.supabase.co`).
    pub url: Option<String>,
    /// Access key sent as `apikey` and bearer token.
    pub key: Option<String>,
    /// Table holding the notes.
    pub table: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            slot_path: None, // Resolved at runtime
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            table: "notes".to_string(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RemoteConfig {
    /// URL and key, if both are present and non-blank.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self.key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((url, key))
    }

    /// Check whether remote mode is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    /// The request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config: Config = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered figment for `config_file`.
    #[must_use]
    pub fn figment(config_file: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(
                Env::raw()
                    .only(&["SUPABASE_URL", "SUPABASE_KEY"])
                    .map(|key| {
                        if key == "supabase_url" {
                            "remote.url".into()
                        } else {
                            "remote.key".into()
                        }
                    }),
            )
            .merge(Env::prefixed("NOTESYNC_").split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.slot_key must not be empty".to_string(),
            });
        }

        if self.remote.table.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "remote.table must not be empty".to_string(),
            });
        }

        if self.remote.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "remote.timeout_secs must be greater than 0".to_string(),
            });
        }

        if let Some(url) = self.remote.url.as_deref().map(str::trim) {
            if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigValidation {
                    message: format!("remote.url must be an http(s) URL, got {url}"),
                });
            }
        }

        Ok(())
    }

    /// A copy safe to display, with the access key masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.remote.key.is_some() {
            shown.remote.key = Some("<redacted>".to_string());
        }
        shown
    }

    /// Get the slot database path, resolving defaults if not set.
    #[must_use]
    pub fn slot_path(&self) -> PathBuf {
        self.storage
            .slot_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SLOT_FILE_NAME))
    }
}
