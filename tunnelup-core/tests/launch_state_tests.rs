//! Unit tests for the launch state machine

use tunnelup_core::error::LaunchError;
use tunnelup_core::launcher::LaunchState;

const ALL_STATES: [LaunchState; 7] = [
    LaunchState::NotStarted,
    LaunchState::ServiceSpawned,
    LaunchState::Waiting,
    LaunchState::TunnelRunning,
    LaunchState::TunnelExited,
    LaunchState::Done,
    LaunchState::Aborted,
];

#[test]
fn test_only_not_started_can_abort() {
    for state in ALL_STATES {
        assert_eq!(
            state.can_transition_to(LaunchState::Aborted),
            state == LaunchState::NotStarted,
            "{} -> aborted",
            state
        );
    }
}

#[test]
fn test_tunnel_spawn_failure_skips_running() {
    let state = LaunchState::Waiting
        .transition(LaunchState::TunnelExited)
        .unwrap();
    assert_eq!(state, LaunchState::TunnelExited);
}

#[test]
fn test_states_cannot_be_skipped_forward() {
    assert!(!LaunchState::NotStarted.can_transition_to(LaunchState::Waiting));
    assert!(!LaunchState::ServiceSpawned.can_transition_to(LaunchState::TunnelRunning));
    assert!(!LaunchState::TunnelRunning.can_transition_to(LaunchState::Done));
}

#[test]
fn test_states_cannot_go_backwards() {
    assert!(!LaunchState::Waiting.can_transition_to(LaunchState::ServiceSpawned));
    assert!(!LaunchState::Done.can_transition_to(LaunchState::NotStarted));
}

#[test]
fn test_terminal_states_have_no_successor() {
    for terminal in [LaunchState::Done, LaunchState::Aborted] {
        assert!(terminal.is_terminal());
        for next in ALL_STATES {
            assert!(!terminal.can_transition_to(next));
        }
    }
}

#[test]
fn test_invalid_transition_error() {
    let err = LaunchState::Done
        .transition(LaunchState::Waiting)
        .unwrap_err();

    assert_eq!(
        err,
        LaunchError::InvalidStateTransition {
            from: LaunchState::Done,
            to: LaunchState::Waiting,
        }
    );
    assert_eq!(
        err.to_string(),
        "Invalid launch state transition: done -> waiting"
    );
}
