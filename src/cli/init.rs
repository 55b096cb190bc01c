//! Init command
//!
//! Writes a configuration file holding the default launch settings.

use colored::Colorize;
use std::path::Path;
use tunnelup_core::config::{toml_config, LaunchConfig};
use tunnelup_core::error::LauncherError;

/// Run the init command
pub fn run_init(config_path: Option<&Path>, force: bool) -> Result<(), LauncherError> {
    let path = super::config_path(config_path)?;

    toml_config::save_config_to_path(&LaunchConfig::default(), &path, force)?;

    println!("{} Wrote default configuration to {}", "✓".green(), path.display());
    println!("Edit service_program, service_args and tunnel_program to match your setup.");
    Ok(())
}
