use std::path::PathBuf;
use thiserror::Error;

/// Main error type for queuewall operations
#[derive(Error, Debug)]
pub enum QueuewallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wallpaper selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Desktop environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Process execution error: {0}")]
    Process(#[from] ProcessError),
}

/// Configuration-related errors. These are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse TOML configuration: {message}")]
    TomlParse { message: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Wallpaper selection errors. All of these are contained to a single
/// scheduled cycle: the cycle is skipped and the loop keeps running.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Failed to read wallpaper directory: {path:?}")]
    DirectoryRead { path: PathBuf, source: std::io::Error },

    #[error("Wallpaper directory is empty: {path:?}")]
    EmptyDirectory { path: PathBuf },

    #[error("Wallpaper file does not exist: {path:?}")]
    MissingWallpaper { path: PathBuf },
}

/// Desktop environment resolution errors
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Unknown target environment: {name}")]
    UnknownSystem { name: String },

    #[error("Environment detection failed: {message}")]
    DetectionFailed { message: String },
}

/// Process execution errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Command execution failed: {command:?}")]
    Execution { command: String, source: std::io::Error },

    #[error("Command returned non-zero exit code: {code}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Required binary not found: {binary}")]
    BinaryNotFound { binary: String },
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, QueuewallError>;

impl From<toml::de::Error> for QueuewallError {
    fn from(err: toml::de::Error) -> Self {
        QueuewallError::Config(ConfigError::TomlParse {
            message: err.to_string(),
        })
    }
}

// Error reporting utilities
pub trait ErrorReporting {
    fn log_error(&self, context: &str);
    fn user_friendly_message(&self) -> String;
}

impl ErrorReporting for QueuewallError {
    fn log_error(&self, context: &str) {
        log::error!("{}: {:?}", context, self);
    }

    fn user_friendly_message(&self) -> String {
        match self {
            QueuewallError::Config(ConfigError::FileRead { path, .. }) => {
                format!("Configuration file not found: {:?}", path)
            }
            QueuewallError::Config(ConfigError::TomlParse { message }) => {
                format!("Invalid configuration format: {}", message)
            }
            QueuewallError::Environment(EnvironmentError::UnknownSystem { name }) => {
                format!(
                    "\"{}\" is not in the list of known environments \
                     (autodetect, gnome, xfce4, lxde, other, windows)",
                    name
                )
            }
            QueuewallError::Selection(SelectionError::MissingWallpaper { path }) => {
                format!("No wallpaper: {:?}", path)
            }
            QueuewallError::Process(ProcessError::BinaryNotFound { binary }) => {
                format!("{} is not installed or not in PATH", binary)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_error_user_friendly_message() {
        let error = ConfigError::FileRead {
            path: PathBuf::from("/nonexistent/config.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "File not found"),
        };
        let queuewall_error = QueuewallError::Config(error);

        let message = queuewall_error.user_friendly_message();
        assert!(message.contains("Configuration file not found"));
        assert!(message.contains("/nonexistent/config.toml"));
    }

    #[test]
    fn test_unknown_system_user_friendly_message() {
        let error = EnvironmentError::UnknownSystem {
            name: "cde".to_string(),
        };
        let queuewall_error = QueuewallError::Environment(error);

        let message = queuewall_error.user_friendly_message();
        assert!(message.contains("cde"));
        assert!(message.contains("known environments"));
    }

    #[test]
    fn test_process_error_user_friendly_message() {
        let error = ProcessError::NonZeroExit {
            code: 1,
            stderr: "no such property".to_string(),
        };
        let queuewall_error = QueuewallError::Process(error);

        let message = queuewall_error.user_friendly_message();
        assert!(message.contains("Command returned non-zero exit code"));
        assert!(message.contains("1"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not [ valid").unwrap_err();
        let queuewall_error: QueuewallError = toml_error.into();

        match queuewall_error {
            QueuewallError::Config(ConfigError::TomlParse { .. }) => {}
            _ => panic!("Expected ConfigError::TomlParse"),
        }
    }
}
