//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands.

use std::path::{Path, PathBuf};
use tunnelup_core::config::{toml_config, LaunchConfig};
use tunnelup_core::error::LauncherError;

pub mod check;
pub mod init;
pub mod show;
pub mod start;

/// Resolve the configuration file path
fn config_path(explicit: Option<&Path>) -> Result<PathBuf, LauncherError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => toml_config::get_config_path(),
    }
}

/// Load the configuration
///
/// An explicitly named file must exist; the default file falls back to
/// built-in defaults when absent.
fn load_config(explicit: Option<&Path>) -> Result<LaunchConfig, LauncherError> {
    match explicit {
        Some(path) => toml_config::load_config_from_path(path),
        None => toml_config::load_config_or_default(config_path(None)?),
    }
}
