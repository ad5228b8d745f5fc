//! Floww: declarative workspace setup
//!
//! Describe which applications belong on which virtual desktop, then let
//! floww switch workspaces and launch everything in a controlled, timed
//! sequence.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Config + Workflow loaders        │
//! │  config.yaml → TimingConfig             │
//! │  workflows/<name>.yaml → Workflow       │
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          WorkflowRunner (apply)         │
//! │  switch → launch → wait → … → final     │
//! └──────┬──────────────┬───────────────┬───┘
//!        ▼              ▼               ▼
//!   Workspace       Launcher        Notifier
//!   (ewmh → wmctrl) (binary/flatpak/snap)
//! ```
//!
//! Launch and switch failures never abort a run: they are collected into a
//! [`RunReport`] whose error count decides the process exit code.

pub mod config;
pub mod format;
pub mod launcher;
pub mod notify;
pub mod signals;
pub mod workflow;
pub mod workspace;

// Re-exports for convenience
pub use config::{ConfigDir, Settings, TimingConfig};
pub use format::FileFormat;
pub use launcher::{LaunchSpec, Launcher, ProcessLauncher};
pub use notify::{DesktopNotifier, LogNotifier, Notification, Notifier};
pub use workflow::{
    resolve_app_wait, AppKind, AppLaunch, Outcome, RunReport, Workflow, WorkflowRunner,
    WorkflowStore, WorkspaceStep,
};
pub use workspace::{EwmhBackend, FallbackBackend, WmctrlBackend, WorkspaceBackend};

/// Crate-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Invalid workflow: {0}")]
    WorkflowSchema(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
