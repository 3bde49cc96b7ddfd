//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; omitted values take the defaults
//! listed below.
//!
//! | Section | Field | Default | Valid |
//! |---------|-------|---------|-------|
//! | `mapping` | `database` | `data/gamecontrollerdb.txt` | any path |
//! | `mapping` | `use_env` | `true` | |
//! | `mapping` | `fallback_uid` | `""` (none) | |
//! | `devices` | `max_devices` | `16` | `1..=64` |
//! | `devices` | `press_threshold` | `0.5` | `(0, 1)` |
//! | `monitor` | `probe_interval_ms` | `1000` | `1..=60000` |
//! | `monitor` | `format` | `text` | `text`, `jsonl` |

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PadmapError, Result};
use crate::mapping::MappingDatabase;
use crate::registry::DispatcherOptions;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub devices: DeviceConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Mapping database configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MappingConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Also read mappings from `SDL_GAMECONTROLLERCONFIG`, ahead of the file.
    #[serde(default = "default_use_env")]
    pub use_env: bool,

    /// Mapping applied to devices whose uid is not in the database.
    #[serde(default)]
    pub fallback_uid: String,
}

/// Device registry configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DeviceConfig {
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,

    #[serde(default = "default_press_threshold")]
    pub press_threshold: f32,
}

/// Event monitor configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MonitorConfig {
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,

    #[serde(default)]
    pub format: OutputFormat,
}

/// How the monitor prints canonical events
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per event
    #[default]
    Text,
    /// One JSON object per line
    Jsonl,
}

// Default value functions
fn default_database() -> PathBuf { PathBuf::from("data/gamecontrollerdb.txt") }
fn default_use_env() -> bool { true }

fn default_max_devices() -> usize { crate::registry::DEFAULT_MAX_DEVICES }
fn default_press_threshold() -> f32 { crate::registry::DEFAULT_PRESS_THRESHOLD }

fn default_probe_interval_ms() -> u64 { 1000 }

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            use_env: default_use_env(),
            fallback_uid: String::new(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            max_devices: default_max_devices(),
            press_threshold: default_press_threshold(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval_ms: default_probe_interval_ms(),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use padmap::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.devices.max_devices == 0 || self.devices.max_devices > 64 {
            return Err(invalid("max_devices must be between 1 and 64"));
        }

        // Rejects NaN as well
        if !(self.devices.press_threshold > 0.0 && self.devices.press_threshold < 1.0) {
            return Err(invalid("press_threshold must be between 0.0 and 1.0 (exclusive)"));
        }

        if self.monitor.probe_interval_ms == 0 || self.monitor.probe_interval_ms > 60000 {
            return Err(invalid("probe_interval_ms must be between 1 and 60000"));
        }

        if self.mapping.database.as_os_str().is_empty() {
            return Err(invalid("mapping database path cannot be empty"));
        }

        Ok(())
    }

    /// Dispatcher options for the `[devices]` and `[mapping]` sections
    #[must_use]
    pub fn dispatcher_options(&self) -> DispatcherOptions {
        let fallback_uid = Some(self.mapping.fallback_uid.trim())
            .filter(|uid| !uid.is_empty())
            .map(str::to_string);

        DispatcherOptions {
            max_devices: self.devices.max_devices,
            press_threshold: self.devices.press_threshold,
            fallback_uid,
        }
    }

    /// Loads the configured mapping database
    ///
    /// Environment mappings, when enabled, take precedence over the file.
    #[must_use]
    pub fn load_database(&self) -> MappingDatabase {
        let database = MappingDatabase::load(&self.mapping.database);
        if self.mapping.use_env {
            database.prepend(MappingDatabase::from_env())
        } else {
            database
        }
    }
}

fn invalid(message: &str) -> PadmapError {
    PadmapError::Config(toml::de::Error::custom(message))
}
