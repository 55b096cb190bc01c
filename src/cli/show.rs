//! Show command
//!
//! Prints the commands a launch would run with the current configuration.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tunnelup_core::config::LaunchConfig;
use tunnelup_core::error::LauncherError;
use tunnelup_core::launcher::CommandSpec;

#[derive(Serialize)]
struct ShowOutput<'a> {
    service: CommandSpec,
    tunnel: CommandSpec,
    startup_delay_secs: u64,
    working_dir: Option<&'a PathBuf>,
    service_log: Option<&'a PathBuf>,
    stop_service_on_exit: bool,
}

impl<'a> ShowOutput<'a> {
    fn new(config: &'a LaunchConfig) -> Self {
        Self {
            service: CommandSpec::service(config),
            tunnel: CommandSpec::tunnel(config),
            startup_delay_secs: config.startup_delay_secs,
            working_dir: config.working_dir.as_ref(),
            service_log: config.service_log.as_ref(),
            stop_service_on_exit: config.stop_service_on_exit,
        }
    }
}

/// Run the show command
pub fn run_show(config_path: Option<&Path>, json: bool) -> Result<(), LauncherError> {
    let config = super::load_config(config_path)?;
    let output = ShowOutput::new(&config);

    if json {
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|e| LauncherError::Io(e.into()))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Service:       {}", output.service);
    println!("Startup delay: {}s", output.startup_delay_secs);
    println!("Tunnel:        {}", output.tunnel);
    match output.working_dir {
        Some(dir) => println!("Working dir:   {}", dir.display()),
        None => println!("Working dir:   (launcher directory)"),
    }
    if let Some(log) = output.service_log {
        println!("Service log:   {}", log.display());
    }
    println!(
        "Stop service on exit: {}",
        if output.stop_service_on_exit { "yes" } else { "no" }
    );
    Ok(())
}
