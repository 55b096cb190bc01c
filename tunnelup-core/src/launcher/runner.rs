//! Launch sequence
//!
//! Drives one launch from `NotStarted` to `Done`: service first, a fixed
//! blind delay, then the tunnel in the foreground, then one acknowledgment.

use crate::config::LaunchConfig;
use crate::error::{ConfigError, LaunchError, LauncherError};
use crate::launcher::process::spawn_detached;
use crate::launcher::{Acknowledge, CommandSpec, ConsoleAcknowledger, LaunchState, ProcessHandle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Grace period granted to the service when `stop_service_on_exit` is set
const SERVICE_STOP_GRACE: Duration = Duration::from_secs(5);

/// How the tunnel phase ended
#[derive(Debug)]
pub enum TunnelOutcome {
    /// The tunnel ran and exited (interrupt, crash and normal exit look alike)
    Exited(ExitStatus),

    /// The tunnel executable could not be started
    SpawnFailed(LaunchError),

    /// The tunnel was started but waiting on it failed
    WaitFailed(String),
}

impl TunnelOutcome {
    /// Closing notice shown before the acknowledgment prompt
    pub fn notice(&self) -> String {
        match self {
            TunnelOutcome::Exited(status) => format!("Tunnel process finished ({}).", status),
            TunnelOutcome::SpawnFailed(e) => format!("{}.", e),
            TunnelOutcome::WaitFailed(reason) => {
                format!("Lost track of tunnel process: {}.", reason)
            }
        }
    }

    /// Outcome of waiting on a tunnel that was started
    pub fn from_wait(result: io::Result<ExitStatus>) -> Self {
        match result {
            Ok(status) => TunnelOutcome::Exited(status),
            Err(e) => {
                error!("Failed to wait for tunnel: {}", e);
                TunnelOutcome::WaitFailed(e.to_string())
            }
        }
    }
}

/// Result of a completed launch
#[derive(Debug)]
pub struct LaunchReport {
    /// The detached service, still running unless it exited on its own or
    /// `stop_service_on_exit` was set
    pub service: ProcessHandle,

    pub tunnel: TunnelOutcome,

    /// When the service spawn returned
    pub service_spawned_at: Instant,

    /// When the tunnel spawn was attempted
    pub tunnel_started_at: Instant,

    /// Every state the launch passed through, in order
    pub history: Vec<LaunchState>,
}

/// Process launcher
pub struct Launcher<A> {
    config: LaunchConfig,
    acknowledger: A,
    state: LaunchState,
    history: Vec<LaunchState>,
}

impl<A: Acknowledge> Launcher<A> {
    /// Create a launcher, validating the configuration first
    pub fn new(config: LaunchConfig, acknowledger: A) -> Result<Self, LauncherError> {
        config
            .validate()
            .map_err(|e| LauncherError::Config(ConfigError::ValidationError { message: e }))?;

        Ok(Self {
            config,
            acknowledger,
            state: LaunchState::NotStarted,
            history: vec![LaunchState::NotStarted],
        })
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Get current launch state
    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// States visited so far, starting with `NotStarted`
    pub fn history(&self) -> &[LaunchState] {
        &self.history
    }

    /// Give back the acknowledger
    pub fn into_acknowledger(self) -> A {
        self.acknowledger
    }

    fn advance(&mut self, next: LaunchState) -> Result<(), LaunchError> {
        self.state = self.state.transition(next)?;
        self.history.push(next);
        debug!("Launch state: {}", next);
        Ok(())
    }

    /// Directory both children run in
    ///
    /// The configured directory, otherwise the directory holding the launcher
    /// executable so relative lookups by the service do not depend on where
    /// the launcher was started from. A relative configured directory is taken
    /// relative to the launcher executable as well.
    pub fn working_dir(&self) -> Result<PathBuf, LaunchError> {
        let dir = match &self.config.working_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => launcher_dir()?.join(dir),
            None => launcher_dir()?,
        };

        if !dir.is_dir() {
            return Err(LaunchError::WorkingDirUnavailable {
                reason: format!("{:?} is not a directory", dir),
            });
        }

        Ok(dir)
    }

    /// Run the launch sequence
    ///
    /// Returns an error without spawning the tunnel when the service cannot
    /// be started. A tunnel that cannot be started is reported in the
    /// returned [`TunnelOutcome`] and still ends with the acknowledgment.
    pub async fn start(&mut self) -> Result<LaunchReport, LauncherError> {
        if self.state != LaunchState::NotStarted {
            return Err(LaunchError::InvalidStateTransition {
                from: self.state,
                to: LaunchState::ServiceSpawned,
            }
            .into());
        }

        let working_dir = match self.working_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("{}", e);
                self.advance(LaunchState::Aborted)?;
                return Err(e.into());
            }
        };
        debug!("Working directory: {:?}", working_dir);

        let service_log = self
            .config
            .service_log
            .as_ref()
            .map(|log| working_dir.join(log));
        let service_spec = CommandSpec::service(&self.config);
        let tunnel_spec = CommandSpec::tunnel(&self.config);

        info!("Starting service: {}", service_spec);
        let mut service = match spawn_detached(
            &service_spec,
            &working_dir,
            service_log.as_deref(),
        ) {
            Ok(handle) => handle,
            Err(e) => {
                error!("{}", e);
                self.advance(LaunchState::Aborted)?;
                return Err(e.into());
            }
        };
        let service_spawned_at = Instant::now();
        self.advance(LaunchState::ServiceSpawned)?;
        info!("Service started with PID {:?}", service.pid());

        self.advance(LaunchState::Waiting)?;
        let delay = self.config.startup_delay();
        info!("Waiting {}s before starting the tunnel", delay.as_secs());
        tokio::time::sleep(delay).await;

        info!("Starting tunnel: {}", tunnel_spec);
        let tunnel_started_at = Instant::now();
        let tunnel = match spawn_attached(&tunnel_spec, &working_dir) {
            Ok(child) => {
                self.advance(LaunchState::TunnelRunning)?;
                TunnelOutcome::from_wait(wait_through_interrupts(child).await)
            }
            Err(e) => {
                error!("{}", e);
                TunnelOutcome::SpawnFailed(e)
            }
        };
        self.advance(LaunchState::TunnelExited)?;

        if self.config.stop_service_on_exit {
            if let Err(e) = service.terminate(SERVICE_STOP_GRACE).await {
                warn!("Failed to stop service: {}", e);
            }
        }

        self.acknowledger
            .acknowledge(&tunnel.notice())
            .map_err(|e| LaunchError::AcknowledgeFailed {
                reason: e.to_string(),
            })?;
        self.advance(LaunchState::Done)?;

        Ok(LaunchReport {
            service,
            tunnel,
            service_spawned_at,
            tunnel_started_at,
            history: self.history.clone(),
        })
    }
}

/// Directory holding the launcher executable
fn launcher_dir() -> Result<PathBuf, LaunchError> {
    let exe = std::env::current_exe().map_err(|e| LaunchError::WorkingDirUnavailable {
        reason: format!("Failed to locate launcher executable: {}", e),
    })?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| LaunchError::WorkingDirUnavailable {
            reason: format!("Executable {:?} has no parent directory", exe),
        })
}

/// Spawn `spec` sharing the launcher's stdin, stdout and stderr
fn spawn_attached(
    spec: &CommandSpec,
    working_dir: &Path,
) -> Result<tokio::process::Child, LaunchError> {
    let mut cmd = spec.to_command(working_dir);
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    cmd.spawn().map_err(|e| LaunchError::TunnelSpawnFailed {
        program: spec.program().to_string(),
        reason: e.to_string(),
    })
}

/// Wait for the tunnel to exit
///
/// Ctrl+C reaches the tunnel through the terminal; the launcher swallows its
/// own copy so it survives to show the closing notice.
async fn wait_through_interrupts(mut child: tokio::process::Child) -> io::Result<ExitStatus> {
    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status?;
                info!("Tunnel exited: {}", status);
                return Ok(status);
            }
            interrupt = tokio::signal::ctrl_c() => {
                if let Err(e) = interrupt {
                    warn!("Cannot listen for interrupts: {}", e);
                    let status = child.wait().await?;
                    info!("Tunnel exited: {}", status);
                    return Ok(status);
                }
                debug!("Interrupt received, waiting for the tunnel to exit");
            }
        }
    }
}

/// Run a launch with the console acknowledger
pub async fn start(config: LaunchConfig) -> Result<LaunchReport, LauncherError> {
    let mut launcher = Launcher::new(config, ConsoleAcknowledger::stdio())?;
    launcher.start().await
}
