//! Workflow definition and execution
//!
//! - **Model**: steps (one per workspace) holding ordered app launches
//! - **Loader**: reads `workflows/<name>.{toml,yaml,yml,json}`
//! - **Timing**: resolves the single wait held after each launch
//! - **Runner**: switches, launches, waits, then reports
//!
//! ## Example Workflow
//!
//! ```yaml
//! description: Morning setup
//! workspaces:
//!   - target: 0
//!     apps:
//!       - name: Terminal
//!         exec: kitty
//!       - name: Editor
//!         exec: ~/bin/editor
//!         args: ["~/notes.md"]
//!         wait: 2
//!   - target: 1
//!     apps:
//!       - name: Browser
//!         exec: org.mozilla.firefox
//!         type: flatpak
//! final_workspace: 0
//! ```

pub mod loader;
pub mod model;
pub mod report;
pub mod runner;
pub mod timing;

pub use loader::{load_file, WorkflowStore};
pub use model::{AppKind, AppLaunch, Workflow, WorkspaceStep};
pub use report::{LaunchRecord, Outcome, RunReport, SwitchRecord};
pub use runner::{RunOptions, WorkflowRunner};
pub use timing::{resolve_app_wait, AppPosition};
