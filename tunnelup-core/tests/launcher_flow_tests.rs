//! Integration tests for the launch sequence
//!
//! Real short-lived processes stand in for the service and the tunnel.
//! `sh -c '<script>' sh` swallows the templated `--host/--port` arguments
//! as positional parameters.

#![cfg(unix)]

use std::io;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tunnelup_core::config::LaunchConfig;
use tunnelup_core::error::{LaunchError, LauncherError};
use tunnelup_core::launcher::{Acknowledge, LaunchState, Launcher, TunnelOutcome};

/// Acknowledger that records every notice instead of reading input
#[derive(Default)]
struct RecordingAck {
    notices: Vec<String>,
}

impl Acknowledge for RecordingAck {
    fn acknowledge(&mut self, notice: &str) -> io::Result<()> {
        self.notices.push(notice.to_string());
        Ok(())
    }
}

fn shell_service(script: &str) -> (String, Vec<String>) {
    (
        "sh".to_string(),
        vec!["-c".to_string(), script.to_string(), "sh".to_string()],
    )
}

fn test_config(dir: &Path) -> LaunchConfig {
    LaunchConfig {
        service_program: "true".to_string(),
        tunnel_program: "true".to_string(),
        startup_delay_secs: 0,
        working_dir: Some(dir.to_path_buf()),
        ..LaunchConfig::default()
    }
}

/// A zombie awaiting its reaper counts as dead
fn is_process_alive(pid: &str) -> bool {
    std::process::Command::new("ps")
        .args(["-o", "stat=", "-p", pid])
        .output()
        .map(|output| {
            let stat = String::from_utf8_lossy(&output.stdout);
            let stat = stat.trim();
            !stat.is_empty() && !stat.starts_with('Z')
        })
        .unwrap_or(false)
}

#[tokio::test]
async fn test_launch_reaches_done_after_one_acknowledgment() {
    let temp_dir = TempDir::new().unwrap();
    let mut launcher =
        Launcher::new(test_config(temp_dir.path()), RecordingAck::default()).unwrap();

    let report = launcher.start().await.expect("launch should succeed");

    assert_eq!(launcher.state(), LaunchState::Done);
    assert_eq!(
        report.history,
        vec![
            LaunchState::NotStarted,
            LaunchState::ServiceSpawned,
            LaunchState::Waiting,
            LaunchState::TunnelRunning,
            LaunchState::TunnelExited,
            LaunchState::Done,
        ]
    );
    match report.tunnel {
        TunnelOutcome::Exited(status) => assert!(status.success()),
        other => panic!("Expected tunnel to exit, got {:?}", other),
    }

    let ack = launcher.into_acknowledger();
    assert_eq!(ack.notices.len(), 1);
    assert!(ack.notices[0].starts_with("Tunnel process finished"));
}

#[tokio::test]
async fn test_missing_service_aborts_before_tunnel() {
    let temp_dir = TempDir::new().unwrap();
    let config = LaunchConfig {
        service_program: "/nonexistent/tunnelup-test-service".to_string(),
        // would leave files named `http` and the port behind if it ever ran
        tunnel_program: "touch".to_string(),
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let result = launcher.start().await;

    match result {
        Err(LauncherError::Launch(LaunchError::ServiceSpawnFailed { program, .. })) => {
            assert_eq!(program, "/nonexistent/tunnelup-test-service");
        }
        other => panic!("Expected service spawn failure, got {:?}", other.map(|r| r.history)),
    }
    assert_eq!(launcher.state(), LaunchState::Aborted);
    assert_eq!(
        launcher.history(),
        &[LaunchState::NotStarted, LaunchState::Aborted]
    );
    assert!(!temp_dir.path().join("http").exists(), "tunnel must never run");
    assert!(launcher.into_acknowledger().notices.is_empty());
}

#[tokio::test]
async fn test_missing_tunnel_is_reported_once() {
    let temp_dir = TempDir::new().unwrap();
    let config = LaunchConfig {
        tunnel_program: "/nonexistent/tunnelup-test-tunnel".to_string(),
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let report = launcher.start().await.expect("tunnel failure is not fatal");

    assert!(matches!(
        report.tunnel,
        TunnelOutcome::SpawnFailed(LaunchError::TunnelSpawnFailed { .. })
    ));
    assert!(!report.history.contains(&LaunchState::TunnelRunning));
    assert_eq!(report.history.last(), Some(&LaunchState::Done));

    let ack = launcher.into_acknowledger();
    assert_eq!(ack.notices.len(), 1);
    assert!(ack.notices[0].contains("Failed to start tunnel process"));
}

#[tokio::test]
async fn test_startup_delay_separates_spawns() {
    let temp_dir = TempDir::new().unwrap();
    let config = LaunchConfig {
        startup_delay_secs: 1,
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let report = launcher.start().await.unwrap();

    let elapsed = report.tunnel_started_at - report.service_spawned_at;
    assert!(elapsed >= Duration::from_secs(1), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_default_delay_is_at_least_three_seconds() {
    let temp_dir = TempDir::new().unwrap();
    let config = LaunchConfig {
        startup_delay_secs: LaunchConfig::default().startup_delay_secs,
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let report = launcher.start().await.unwrap();

    assert!(report.tunnel_started_at - report.service_spawned_at >= Duration::from_secs(3));
}

#[tokio::test]
async fn test_service_gets_port_and_working_dir() {
    let temp_dir = TempDir::new().unwrap();
    let (program, args) = shell_service("echo \"$(pwd -P) $*\" > started.txt");
    let config = LaunchConfig {
        service_port: 8123,
        service_program: program,
        service_args: args,
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let mut report = launcher.start().await.unwrap();
    report.service.wait().await.unwrap();

    let written = std::fs::read_to_string(temp_dir.path().join("started.txt")).unwrap();
    let expected_dir = temp_dir.path().canonicalize().unwrap();
    assert_eq!(
        written.trim(),
        format!("{} --host 0.0.0.0 --port 8123", expected_dir.display())
    );
}

#[tokio::test]
async fn test_service_output_goes_to_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("service.log");
    let (program, args) = shell_service("echo service says hello; echo oops >&2");
    let config = LaunchConfig {
        service_program: program,
        service_args: args,
        service_log: Some(log_path.clone()),
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let mut report = launcher.start().await.unwrap();
    report.service.wait().await.unwrap();

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("service says hello"));
    assert!(log.contains("oops"));
}

#[tokio::test]
async fn test_service_left_running_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let (program, args) = shell_service("sleep 30");
    let config = LaunchConfig {
        service_program: program,
        service_args: args,
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let mut report = launcher.start().await.unwrap();

    assert!(report.service.is_running());
    report
        .service
        .terminate(Duration::from_secs(2))
        .await
        .unwrap();
    assert!(!report.service.is_running());
}

#[tokio::test]
async fn test_stop_service_on_exit_terminates_service() {
    let temp_dir = TempDir::new().unwrap();
    let (program, args) = shell_service("sleep 30");
    let config = LaunchConfig {
        service_program: program,
        service_args: args,
        stop_service_on_exit: true,
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let mut report = launcher.start().await.unwrap();

    assert!(!report.service.is_running());
}

#[tokio::test]
async fn test_stop_service_on_exit_reaches_background_children() {
    let temp_dir = TempDir::new().unwrap();
    // the group leader exits at once, leaving its child behind
    let (program, args) = shell_service("sleep 30 & echo $! > child.pid");
    let config = LaunchConfig {
        service_program: program,
        service_args: args,
        stop_service_on_exit: true,
        startup_delay_secs: 1,
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    launcher.start().await.unwrap();

    let pid = std::fs::read_to_string(temp_dir.path().join("child.pid")).unwrap();
    assert!(
        !is_process_alive(pid.trim()),
        "background child {} survived",
        pid.trim()
    );
}

#[tokio::test]
async fn test_relative_service_log_lands_in_working_dir() {
    let temp_dir = TempDir::new().unwrap();
    let (program, args) = shell_service("echo logged");
    let config = LaunchConfig {
        service_program: program,
        service_args: args,
        service_log: Some("service.log".into()),
        ..test_config(temp_dir.path())
    };
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let mut report = launcher.start().await.unwrap();
    report.service.wait().await.unwrap();

    let log = std::fs::read_to_string(temp_dir.path().join("service.log")).unwrap();
    assert_eq!(log.trim(), "logged");
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut launcher =
        Launcher::new(test_config(temp_dir.path()), RecordingAck::default()).unwrap();

    launcher.start().await.unwrap();
    let second = launcher.start().await;

    assert!(matches!(
        second,
        Err(LauncherError::Launch(LaunchError::InvalidStateTransition {
            from: LaunchState::Done,
            ..
        }))
    ));
    assert_eq!(launcher.into_acknowledger().notices.len(), 1);
}

#[tokio::test]
async fn test_missing_working_dir_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir.path().join("does-not-exist"));
    let mut launcher = Launcher::new(config, RecordingAck::default()).unwrap();

    let result = launcher.start().await;

    assert!(matches!(
        result,
        Err(LauncherError::Launch(LaunchError::WorkingDirUnavailable { .. }))
    ));
    assert_eq!(launcher.state(), LaunchState::Aborted);
}

#[test]
fn test_invalid_config_rejected_by_launcher() {
    let config = LaunchConfig {
        service_program: String::new(),
        ..LaunchConfig::default()
    };

    assert!(matches!(
        Launcher::new(config, RecordingAck::default()),
        Err(LauncherError::Config(_))
    ));
}
