//! Core library for the tunnelup launcher
//!
//! This crate provides configuration handling, the launch state machine and
//! the process management used to start a local service and expose it
//! through a tunnel.

pub mod error;

pub mod config;
pub mod launcher;

/// Initialize logging infrastructure
///
/// Sets up tracing with systemd journal logging when running under systemd.
/// Otherwise logs to stderr. `verbose` lowers the level filter to DEBUG.
pub fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(level)
                .init();
            return Ok(());
        }
    }

    // The tunnel owns the terminal once it starts, so keep records compact
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(level)
        .init();

    Ok(())
}
