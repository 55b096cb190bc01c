//! Error types for the tunnelup launcher
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use crate::launcher::LaunchState;
use thiserror::Error;

/// Main error type for the tunnelup application
#[derive(Error, Debug)]
pub enum LauncherError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while starting or supervising the child processes
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LauncherError {
    /// True for the spawn failures the launcher reports without treating
    /// them as a failed run
    pub fn is_spawn_failure(&self) -> bool {
        matches!(
            self,
            LauncherError::Launch(
                LaunchError::ServiceSpawnFailed { .. } | LaunchError::TunnelSpawnFailed { .. }
            )
        )
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Configuration file already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Process launch errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Failed to start service process '{program}': {reason}")]
    ServiceSpawnFailed { program: String, reason: String },

    #[error("Failed to start tunnel process '{program}': {reason}")]
    TunnelSpawnFailed { program: String, reason: String },

    #[error("Working directory unavailable: {reason}")]
    WorkingDirUnavailable { reason: String },

    #[error("Invalid launch state transition: {from} -> {to}")]
    InvalidStateTransition { from: LaunchState, to: LaunchState },

    #[error("Failed to read acknowledgment: {reason}")]
    AcknowledgeFailed { reason: String },

    #[error("Failed to terminate process {pid}: {reason}")]
    TerminationFailed { pid: u32, reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, LauncherError>;
