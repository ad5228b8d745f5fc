//! Workspace switching backends
//!
//! Supports:
//! - EWMH via `xdotool` (primary)
//! - `wmctrl` (fallback)
//!
//! The default backend tries the primary first and only falls back when it
//! fails.

mod ewmh;
mod fallback;
mod wmctrl;

pub use ewmh::EwmhBackend;
pub use fallback::FallbackBackend;
pub use wmctrl::WmctrlBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// EWMH first, then wmctrl
    #[default]
    Auto,
    Ewmh,
    Wmctrl,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Auto => write!(f, "auto"),
            BackendKind::Ewmh => write!(f, "ewmh"),
            BackendKind::Wmctrl => write!(f, "wmctrl"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "ewmh" | "xdotool" => Ok(BackendKind::Ewmh),
            "wmctrl" => Ok(BackendKind::Wmctrl),
            _ => Err(Error::Config(format!("Unknown workspace backend: {}", s))),
        }
    }
}

/// Something that can make a workspace the active one
#[async_trait]
pub trait WorkspaceBackend: Send + Sync {
    /// Name of this backend
    fn name(&self) -> &str;

    /// Switch to the zero-indexed workspace
    async fn switch_to(&self, index: u32) -> Result<()>;
}

/// Create a backend of the given kind
pub fn create_backend(kind: BackendKind) -> Box<dyn WorkspaceBackend> {
    match kind {
        BackendKind::Auto => Box::new(FallbackBackend::new(
            Box::new(EwmhBackend::default()),
            Box::new(WmctrlBackend::default()),
        )),
        BackendKind::Ewmh => Box::new(EwmhBackend::default()),
        BackendKind::Wmctrl => Box::new(WmctrlBackend::default()),
    }
}

/// Run a helper program to completion and return its trimmed stdout
pub(crate) async fn run_command(program: &str, args: &[String]) -> Result<String> {
    debug!("Running: {} {}", program, shell_words::join(args));

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::Workspace(format!("command not found: {}", program)),
            _ => Error::Workspace(format!("failed to run {}: {}", program, e)),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Workspace(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
