//! Service process spawning and supervision
//!
//! The service is spawned detached from the launcher's terminal. The returned
//! [`ProcessHandle`] lets a caller poll or terminate it; the launcher itself
//! never does unless asked to.

use crate::error::LaunchError;
use crate::launcher::CommandSpec;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Child;
use tracing::{debug, info};

/// Poll interval while waiting for a terminated process to exit
#[cfg(unix)]
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

/// Handle to a detached service process
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    pid: Option<u32>,
    command: String,
}

impl ProcessHandle {
    /// Process ID, if the OS reported one
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The command line the process was started with
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Return the exit status if the process has already exited
    pub fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Check if the process is still running
    pub fn is_running(&mut self) -> bool {
        matches!(self.try_wait(), Ok(None))
    }

    /// Wait for the process to exit
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Terminate the process
    ///
    /// Sends SIGTERM to the whole process group, even when the leader has
    /// already exited, and waits up to `grace` for the group to empty before
    /// force-killing it. Elsewhere the process is killed outright.
    pub async fn terminate(&mut self, grace: Duration) -> Result<(), LaunchError> {
        let pid = match self.pid {
            Some(pid) => pid,
            None => {
                debug!("Service process has no PID, nothing to terminate");
                return Ok(());
            }
        };

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;
            use std::time::Instant;

            let group = Pid::from_raw(pid as i32);

            info!("Sending SIGTERM to service process group {}", pid);
            match killpg(group, Signal::SIGTERM) {
                Ok(()) => {}
                Err(Errno::ESRCH) => {
                    debug!("Process group {} already gone", pid);
                    let _ = self.try_wait();
                    return Ok(());
                }
                Err(e) => {
                    return Err(LaunchError::TerminationFailed {
                        pid,
                        reason: format!("Failed to send SIGTERM: {}", e),
                    })
                }
            }

            let deadline = Instant::now() + grace;
            while Instant::now() < deadline {
                tokio::time::sleep(EXIT_POLL_INTERVAL).await;
                // reap the leader so its zombie does not keep the group alive
                let _ = self.try_wait();
                if killpg(group, None) == Err(Errno::ESRCH) {
                    info!("Service process group {} terminated gracefully", pid);
                    return Ok(());
                }
            }

            tracing::warn!("Graceful shutdown timed out, sending SIGKILL to {}", pid);
            if let Err(e) = killpg(group, Signal::SIGKILL) {
                if e != Errno::ESRCH {
                    return Err(LaunchError::TerminationFailed {
                        pid,
                        reason: format!("Failed to send SIGKILL: {}", e),
                    });
                }
            }

            self.child
                .wait()
                .await
                .map_err(|e| LaunchError::TerminationFailed {
                    pid,
                    reason: e.to_string(),
                })?;
        }

        #[cfg(not(unix))]
        {
            let _ = grace;
            if !self.is_running() {
                debug!("Service process {} already exited", pid);
                return Ok(());
            }
            self.child
                .kill()
                .await
                .map_err(|e| LaunchError::TerminationFailed {
                    pid,
                    reason: e.to_string(),
                })?;
        }

        info!("Service process {} killed", pid);
        Ok(())
    }
}

/// Spawn `spec` detached from the launcher's terminal
///
/// On Unix the child leads its own process group so terminal signals aimed at
/// the launcher never reach it; on Windows it gets a new console. Output goes
/// to `log_file` when given, otherwise it is discarded.
pub fn spawn_detached(
    spec: &CommandSpec,
    working_dir: &Path,
    log_file: Option<&Path>,
) -> Result<ProcessHandle, LaunchError> {
    let spawn_error = |reason: String| LaunchError::ServiceSpawnFailed {
        program: spec.program().to_string(),
        reason,
    };

    let mut cmd = spec.to_command(working_dir);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| spawn_error(format!("Failed to open log file {:?}: {}", path, e)))?;
            let stderr = file
                .try_clone()
                .map_err(|e| spawn_error(format!("Failed to clone log file handle: {}", e)))?;
            cmd.stdout(Stdio::from(file)).stderr(Stdio::from(stderr));
        }
        None => {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
    }

    #[cfg(unix)]
    cmd.process_group(0);

    #[cfg(windows)]
    cmd.creation_flags(CREATE_NEW_CONSOLE);

    let child = cmd.spawn().map_err(|e| spawn_error(e.to_string()))?;
    let pid = child.id();

    debug!("Service process spawned with PID: {:?}", pid);

    Ok(ProcessHandle {
        child,
        pid,
        command: spec.to_string(),
    })
}
