//! tunnelup - service and tunnel launcher
//!
//! Starts a local network service detached, waits a fixed delay, then runs a
//! tunnel to it in the foreground until the tunnel exits.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tunnelup_core::{error::LauncherError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "tunnelup")]
#[command(about = "Start a local service and expose it through a tunnel")]
struct Cli {
    /// Configuration file (defaults to ~/.config/tunnelup/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the service, then the tunnel (default)
    Start(cli::start::StartArgs),
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Show the commands that would be run
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the service and tunnel executables can be found
    Check,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let config_path = cli.config.as_deref();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Start(cli::start::StartArgs::default()));

    let result = match command {
        Commands::Start(args) => cli::start::run_start(config_path, &args),
        Commands::Init { force } => cli::init::run_init(config_path, force),
        Commands::Show { json } => cli::show::run_show(config_path, json),
        Commands::Check => cli::check::run_check(config_path),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{}", e);

            let exit_code = match e {
                // Spawn failures are reported but do not fail the run
                ref e if e.is_spawn_failure() => 0,
                // Configuration errors (exit code 2)
                LauncherError::Config(_)
                | LauncherError::Toml(_)
                | LauncherError::TomlSerialize(_) => 2,
                // Runtime errors (exit code 1)
                LauncherError::Launch(_) | LauncherError::Io(_) => 1,
            };

            std::process::exit(exit_code);
        }
    }
}
