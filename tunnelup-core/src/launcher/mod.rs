//! Launcher module
//!
//! Starts the service process detached, waits the configured delay, then runs
//! the tunnel process in the foreground until it exits.

pub mod acknowledge;
pub mod command;
pub mod process;
pub mod runner;
pub mod state;

// Public re-exports
pub use acknowledge::{Acknowledge, ConsoleAcknowledger};
pub use command::CommandSpec;
pub use process::ProcessHandle;
pub use runner::{start, LaunchReport, Launcher, TunnelOutcome};
pub use state::LaunchState;
