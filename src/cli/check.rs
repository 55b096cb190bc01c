//! Check command
//!
//! Verifies that the service and tunnel executables resolve on `PATH`.

use colored::Colorize;
use std::path::Path;
use tracing::debug;
use tunnelup_core::error::{ConfigError, LauncherError};

/// Run the check command
pub fn run_check(config_path: Option<&Path>) -> Result<(), LauncherError> {
    let config = super::load_config(config_path)?;

    let mut missing = Vec::new();
    for (role, program) in [
        ("service", &config.service_program),
        ("tunnel", &config.tunnel_program),
    ] {
        match which::which(program) {
            Ok(path) => {
                debug!("Resolved {} executable {} to {:?}", role, program, path);
                println!("{} {:<8} {}", "✓".green(), role, path.display());
            }
            Err(e) => {
                println!("{} {:<8} {} ({})", "✗".red(), role, program, e);
                missing.push(program.as_str());
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LauncherError::Config(ConfigError::ValidationError {
            message: format!("Executable not found: {}", missing.join(", ")),
        }))
    }
}
