//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a small TOML file. Everything in it is
//! optional; a missing file means all defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "VMC_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "vmc.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (optional, see [`RootFolderResolver`])
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// SQLite file; relative paths are taken from the root folder
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Broadcast buffer per display subscriber
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_port() -> u16 {
    5740
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_event_capacity() -> usize {
    crate::events::DEFAULT_EVENT_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            bind_address: default_bind_address(),
            database_path: None,
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read the config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!("Loaded TOML configuration from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Database location for a resolved root folder
    pub fn database_file(&self, root_folder: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root_folder.join(path),
            None => root_folder.join(DATABASE_FILE),
        }
    }
}

/// Default config file location for the platform
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("vmc").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("vmc-config.toml"))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("vmc"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\vmc"))
    } else {
        // ~/.local/share/vmc on Linux, ~/Library/Application Support/vmc on macOS
        dirs::data_local_dir()
            .map(|d| d.join("vmc"))
            .unwrap_or_else(|| PathBuf::from("./vmc_data"))
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `VMC_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent default
pub struct RootFolderResolver {
    module_name: String,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    pub fn resolve(&self, cli_arg: Option<&Path>, toml_value: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            info!("{}: root folder {} (command line)", self.module_name, path.display());
            return path.to_path_buf();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("{}: root folder {} ({})", self.module_name, path, ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = toml_value {
            info!("{}: root folder {} (config file)", self.module_name, path.display());
            return path.to_path_buf();
        }

        let path = default_root_folder();
        info!("{}: root folder {} (default)", self.module_name, path.display());
        path
    }
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created root folder {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.port, 5740);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 8080
            database_path = "data/matches.db"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.database_file(Path::new("/srv/vmc")),
            PathBuf::from("/srv/vmc/data/matches.db")
        );
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_default_database_file() {
        let config = TomlConfig::default();
        assert_eq!(
            config.database_file(Path::new("/tmp/root")),
            PathBuf::from("/tmp/root").join(DATABASE_FILE)
        );
    }
}
