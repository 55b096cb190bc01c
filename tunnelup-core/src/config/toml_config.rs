//! TOML configuration file I/O
//!
//! Handles loading and saving the launch configuration to/from TOML files
//! in the user's configuration directory.

use crate::config::LaunchConfig;
use crate::error::{ConfigError, LauncherError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "TUNNELUP_CONFIG_DIR";

/// Get the default configuration directory
///
/// Returns ~/.config/tunnelup, or the TUNNELUP_CONFIG_DIR environment
/// variable if set.
pub fn get_config_dir() -> Result<PathBuf, LauncherError> {
    if let Ok(config_dir) = std::env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| {
            LauncherError::Config(ConfigError::IoError {
                message: "HOME environment variable not set".to_string(),
            })
        })?;

    Ok(PathBuf::from(home).join(".config").join("tunnelup"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, LauncherError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from a specific TOML file
///
/// A missing file is an error here; see [`load_config_or_default`].
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<LaunchConfig, LauncherError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LauncherError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => LauncherError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let mut config: LaunchConfig = toml::from_str(&contents)?;

    // relative paths in the file are relative to the file, not the caller's cwd
    let base = path
        .as_ref()
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    config.resolve_relative_paths(&base);

    config
        .validate()
        .map_err(|e| LauncherError::Config(ConfigError::ValidationError { message: e }))?;

    debug!("Loaded configuration from {:?}", path.as_ref());
    Ok(config)
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<LaunchConfig, LauncherError> {
    if !path.as_ref().exists() {
        debug!(
            "No configuration file at {:?}, using defaults",
            path.as_ref()
        );
        return Ok(LaunchConfig::default());
    }
    load_config_from_path(path)
}

/// Save configuration to a specific TOML file
///
/// Refuses to replace an existing file unless `overwrite` is set.
pub fn save_config_to_path<P: AsRef<Path>>(
    config: &LaunchConfig,
    path: P,
    overwrite: bool,
) -> Result<(), LauncherError> {
    let path = path.as_ref();

    config
        .validate()
        .map_err(|e| LauncherError::Config(ConfigError::ValidationError { message: e }))?;

    if path.exists() && !overwrite {
        return Err(LauncherError::Config(ConfigError::AlreadyExists {
            path: path.to_string_lossy().to_string(),
        }));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            LauncherError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let contents = toml::to_string_pretty(config)?;

    std::fs::write(path, contents).map_err(|_| {
        LauncherError::Config(ConfigError::SaveFailed {
            path: path.to_string_lossy().to_string(),
        })
    })?;

    info!("Saved launch configuration to {:?}", path);
    Ok(())
}
