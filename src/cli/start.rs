//! Start command
//!
//! Loads the configuration, applies command-line overrides and runs the
//! launch sequence on a single-threaded runtime.

use clap::Args;
use colored::Colorize;
use std::path::Path;
use tracing::info;
use tunnelup_core::config::LaunchConfig;
use tunnelup_core::error::{ConfigError, LauncherError};
use tunnelup_core::launcher::{self, CommandSpec};

/// Overrides for a single run
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port the service binds and the tunnel exposes
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Service executable
    #[arg(long, value_name = "PROGRAM")]
    pub service: Option<String>,

    /// Tunnel executable
    #[arg(long, value_name = "PROGRAM")]
    pub tunnel: Option<String>,

    /// Seconds to wait between starting the service and the tunnel
    #[arg(long, value_name = "SECS")]
    pub delay: Option<u64>,

    /// Stop the service once the tunnel exits
    #[arg(long)]
    pub stop_service_on_exit: bool,
}

impl StartArgs {
    /// Apply the overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut LaunchConfig) {
        if let Some(port) = self.port {
            config.service_port = port;
        }
        if let Some(service) = &self.service {
            config.service_program = service.clone();
        }
        if let Some(tunnel) = &self.tunnel {
            config.tunnel_program = tunnel.clone();
        }
        if let Some(delay) = self.delay {
            config.startup_delay_secs = delay;
        }
        if self.stop_service_on_exit {
            config.stop_service_on_exit = true;
        }
    }
}

/// Run the start command
pub fn run_start(config_path: Option<&Path>, args: &StartArgs) -> Result<(), LauncherError> {
    let mut config = super::load_config(config_path)?;
    args.apply(&mut config);
    config
        .validate()
        .map_err(|e| LauncherError::Config(ConfigError::ValidationError { message: e }))?;

    println!("{} {}", "Service:".bold(), CommandSpec::service(&config));
    println!("{} {}", "Tunnel: ".bold(), CommandSpec::tunnel(&config));
    println!();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut report = runtime.block_on(launcher::start(config))?;
    info!("Launch finished: {}", report.tunnel.notice());

    if report.service.is_running() {
        println!(
            "Service (PID {}) is still running: {}",
            report
                .service
                .pid()
                .map(|pid| pid.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            report.service.command()
        );
    }

    Ok(())
}
