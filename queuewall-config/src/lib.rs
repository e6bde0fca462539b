use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use queuewall_common::error::ConfigError;
use queuewall_common::{QueuewallError, Result, ScheduleConfig, ScheduleMode};

/// The options recognized in `~/.config/queuewall/config.toml`. Every field
/// has a default, so an empty or absent file is a valid configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Custom wallpaper command template, `%s` replaced with the image path.
    /// Overrides `system` when set.
    #[serde(default)]
    pub command: Option<String>,
    /// Composite the image's name onto it before applying
    #[serde(default)]
    pub caption: bool,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Minutes between changes. 60 aligns changes to the hour boundary; any
    /// other value counts from now.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Default the log filter to info instead of warn. RUST_LOG still wins.
    #[serde(default)]
    pub log: bool,
    /// Pick a random file from the directory instead of the hour-named one
    #[serde(default)]
    pub random: bool,
    #[serde(default = "default_system")]
    pub system: String,
    /// Accept restart/reload/exit commands on stdin
    #[serde(default)]
    pub terminal: bool,
    /// Where captioned and converted copies go. Defaults to the system temp
    /// directory.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

fn default_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("docs/images/wallpapers")
}

fn default_extension() -> String {
    "jpg".to_string()
}

fn default_interval() -> u64 {
    60
}

fn default_system() -> String {
    "autodetect".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: None,
            caption: false,
            directory: default_directory(),
            extension: default_extension(),
            interval: default_interval(),
            log: false,
            random: false,
            system: default_system(),
            terminal: false,
            temp_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location. A missing file yields the defaults; a
    /// present but unreadable or malformed file is an error.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no configuration file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            QueuewallError::Config(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| QueuewallError::Config(ConfigError::NoConfigDir))?
            .join("queuewall");

        Ok(config_dir.join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval < 1 {
            return Err(QueuewallError::Config(ConfigError::InvalidValue {
                field: "interval".to_string(),
                value: self.interval.to_string(),
            }));
        }

        if self.extension.is_empty() {
            return Err(QueuewallError::Config(ConfigError::InvalidValue {
                field: "extension".to_string(),
                value: "(empty)".to_string(),
            }));
        }

        Ok(())
    }

    /// Derive the scheduling core's view of this configuration. `random`
    /// wins over `interval`; an interval of 60 means hour-aligned changes.
    pub fn to_schedule(&self) -> ScheduleConfig {
        let mode = if self.random {
            ScheduleMode::Random
        } else if self.interval == 60 {
            ScheduleMode::HourlyByClock
        } else {
            ScheduleMode::FixedInterval(self.interval)
        };

        ScheduleConfig {
            mode,
            directory: self.directory.clone(),
            extension: self.extension.clone(),
        }
    }
}
