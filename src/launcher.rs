//! Application launching
//!
//! Turns an [`AppLaunch`] into a concrete program + argument list and starts
//! it detached. Launches are fire-and-forget: only spawn-time failures are
//! reported.

use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::workflow::{AppKind, AppLaunch};
use crate::{Error, Result};

/// Program used to run Flatpak applications
pub const FLATPAK_RUNNER: &str = "flatpak";

/// Resolved command for one app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// Build the command for an app according to its kind
    pub fn for_app(app: &AppLaunch) -> Self {
        let args = app.args.iter().map(|a| expand_tilde(a));

        match app.kind {
            AppKind::Binary => Self {
                program: expand_tilde(&app.exec),
                args: args.collect(),
            },
            AppKind::Flatpak => Self {
                program: FLATPAK_RUNNER.to_string(),
                args: ["run".to_string(), app.exec.clone()]
                    .into_iter()
                    .chain(args)
                    .collect(),
            },
            AppKind::Snap => Self {
                program: app.exec.clone(),
                args: args.collect(),
            },
        }
    }

    /// Shell-quoted command line, for display only
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|s| shell_words::quote(s).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

fn expand_tilde(value: &str) -> String {
    shellexpand::tilde(value).into_owned()
}

/// A successfully started application
#[derive(Debug, Clone)]
pub struct Spawned {
    pub pid: Option<u32>,
    pub spec: LaunchSpec,
}

/// Starts applications
pub trait Launcher: Send + Sync {
    /// Start `app` without waiting for it to exit
    fn launch(&self, app: &AppLaunch) -> Result<Spawned>;
}

/// Launcher that spawns real processes
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    fn spawn(&self, name: &str, spec: &LaunchSpec) -> Result<Option<u32>> {
        if spec.program.trim().is_empty() {
            return Err(Error::Launch(format!("empty command for '{}'", name)));
        }

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group, so the app outlives a Ctrl+C aimed at floww
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::Launch(format!(
                "command not found for '{}': {}",
                name, spec.program
            )),
            ErrorKind::PermissionDenied => Error::Launch(format!(
                "permission denied when launching '{}': {}",
                name, spec.program
            )),
            _ => Error::Launch(format!("error launching {} ({}): {}", name, spec.program, e)),
        })?;

        Ok(child.id())
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, app: &AppLaunch) -> Result<Spawned> {
        let spec = LaunchSpec::for_app(app);
        debug!("Launching {} ({}): {}", app.name, app.kind, spec);

        let pid = self.spawn(&app.name, &spec)?;
        match pid {
            Some(pid) => info!("Launched {} (PID: {})", app.name, pid),
            None => info!("Launched {}", app.name),
        }

        Ok(Spawned { pid, spec })
    }
}
