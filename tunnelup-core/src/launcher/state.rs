//! Launch state management
//!
//! Defines the linear state machine a single launch walks through.

use crate::error::LaunchError;

/// Launch states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchState {
    /// Nothing spawned yet
    #[default]
    NotStarted,

    /// Service process spawned
    ServiceSpawned,

    /// Sleeping through the startup delay
    Waiting,

    /// Tunnel process running in the foreground
    TunnelRunning,

    /// Tunnel process exited (or could not be started)
    TunnelExited,

    /// Acknowledged by the user, launch finished
    Done,

    /// Service could not be started, launch abandoned
    Aborted,
}

impl LaunchState {
    /// Whether moving from `self` to `next` is allowed
    pub fn can_transition_to(self, next: LaunchState) -> bool {
        use LaunchState::*;

        matches!(
            (self, next),
            (NotStarted, ServiceSpawned)
                | (NotStarted, Aborted)
                | (ServiceSpawned, Waiting)
                | (Waiting, TunnelRunning)
                // tunnel spawn failure skips the wait
                | (Waiting, TunnelExited)
                | (TunnelRunning, TunnelExited)
                | (TunnelExited, Done)
        )
    }

    /// Validate and return the next state
    pub fn transition(self, next: LaunchState) -> Result<LaunchState, LaunchError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(LaunchError::InvalidStateTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Check if no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchState::Done | LaunchState::Aborted)
    }
}

impl std::fmt::Display for LaunchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchState::NotStarted => write!(f, "not started"),
            LaunchState::ServiceSpawned => write!(f, "service spawned"),
            LaunchState::Waiting => write!(f, "waiting"),
            LaunchState::TunnelRunning => write!(f, "tunnel running"),
            LaunchState::TunnelExited => write!(f, "tunnel exited"),
            LaunchState::Done => write!(f, "done"),
            LaunchState::Aborted => write!(f, "aborted"),
        }
    }
}
