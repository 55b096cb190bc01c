//! Configuration module
//!
//! Holds the launch configuration and loads/saves it from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod toml_config;

/// Default port the service binds and the tunnel targets
pub const DEFAULT_SERVICE_PORT: u16 = 8000;

/// Default service executable
pub const DEFAULT_SERVICE_PROGRAM: &str = "run-service";

/// Default bind address passed to the service
pub const DEFAULT_SERVICE_HOST: &str = "0.0.0.0";

/// Default tunnel executable
pub const DEFAULT_TUNNEL_PROGRAM: &str = "tunnel";

/// Default pause between spawning the service and the tunnel
pub const DEFAULT_STARTUP_DELAY_SECS: u64 = 3;

/// Launch configuration
///
/// Every field has a default so a partial (or missing) config file still
/// yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// TCP port the service binds and the tunnel exposes
    pub service_port: u16,

    /// Service executable, resolved through `PATH`
    pub service_program: String,

    /// Arguments placed before the templated `--host`/`--port` pair
    pub service_args: Vec<String>,

    /// Bind address passed to the service
    pub service_host: String,

    /// Tunnel executable, resolved through `PATH`
    pub tunnel_program: String,

    /// Fixed delay in seconds between the two spawns
    pub startup_delay_secs: u64,

    /// Working directory for both children (defaults to the launcher's directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// File receiving the service's stdout and stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_log: Option<PathBuf>,

    /// Terminate the service once the tunnel exits
    pub stop_service_on_exit: bool,
}

impl LaunchConfig {
    /// Create a configuration for the given port and tunnel executable
    pub fn new(service_port: u16, tunnel_program: String) -> Self {
        Self {
            service_port,
            tunnel_program,
            ..Self::default()
        }
    }

    /// Startup delay as a `Duration`
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    /// Anchor a relative `working_dir` or `service_log` at `base`
    pub fn resolve_relative_paths(&mut self, base: &Path) {
        for path in [&mut self.working_dir, &mut self.service_log]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.service_port == 0 {
            return Err("Service port cannot be zero".to_string());
        }

        validate_program("Service program", &self.service_program)?;
        validate_program("Tunnel program", &self.tunnel_program)?;

        if self.service_host.trim().is_empty() {
            return Err("Service host cannot be empty".to_string());
        }

        if self.service_args.iter().any(|arg| arg.is_empty()) {
            return Err("Service arguments cannot contain empty values".to_string());
        }

        Ok(())
    }
}

fn validate_program(label: &str, program: &str) -> Result<(), String> {
    if program.is_empty() {
        return Err(format!("{} cannot be empty", label));
    }
    if program.trim() != program {
        return Err(format!("{} cannot have surrounding whitespace", label));
    }
    Ok(())
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            service_port: DEFAULT_SERVICE_PORT,
            service_program: DEFAULT_SERVICE_PROGRAM.to_string(),
            service_args: Vec::new(),
            service_host: DEFAULT_SERVICE_HOST.to_string(),
            tunnel_program: DEFAULT_TUNNEL_PROGRAM.to_string(),
            startup_delay_secs: DEFAULT_STARTUP_DELAY_SECS,
            working_dir: None,
            service_log: None,
            stop_service_on_exit: false,
        }
    }
}
