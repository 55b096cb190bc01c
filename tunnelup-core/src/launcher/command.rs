//! Command templates for the service and tunnel processes

use crate::config::LaunchConfig;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Tunnel protocol argument passed ahead of the port
const TUNNEL_PROTOCOL: &str = "http";

/// A program together with its argument vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Create a command from a program and its arguments
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `<service_program> <service_args...> --host <host> --port <port>`
    pub fn service(config: &LaunchConfig) -> Self {
        let port = config.service_port.to_string();
        let args = config
            .service_args
            .iter()
            .cloned()
            .chain([
                "--host".to_string(),
                config.service_host.clone(),
                "--port".to_string(),
                port,
            ]);

        Self::new(config.service_program.clone(), args)
    }

    /// `<tunnel_program> http <port>`
    pub fn tunnel(config: &LaunchConfig) -> Self {
        Self::new(
            config.tunnel_program.clone(),
            [TUNNEL_PROTOCOL.to_string(), config.service_port.to_string()],
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The port embedded in the command, if any
    ///
    /// Reads the value after `--port`, falling back to a trailing numeric
    /// argument.
    pub fn port(&self) -> Option<u16> {
        if let Some(pos) = self.args.iter().position(|arg| arg == "--port") {
            return self.args.get(pos + 1).and_then(|p| p.parse().ok());
        }
        self.args.last().and_then(|p| p.parse().ok())
    }

    /// Build a tokio command rooted at `working_dir` with stdin closed
    pub(crate) fn to_command(&self, working_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(working_dir)
            .stdin(Stdio::null());
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
