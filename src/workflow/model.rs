//! Workflow definition structures

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A complete workflow: an ordered list of workspace steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Workspace to switch to once every step has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_workspace: Option<u32>,

    /// Steps in execution order
    #[serde(rename = "workspaces")]
    pub steps: Vec<WorkspaceStep>,
}

/// One workspace's worth of application launches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceStep {
    /// Zero-indexed workspace number
    pub target: u32,

    /// Applications to launch, in order
    pub apps: Vec<AppLaunch>,
}

/// A single application launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppLaunch {
    /// Display name
    pub name: String,

    /// Binary path/name, Flatpak application id, or Snap command
    pub exec: String,

    /// How `exec` is interpreted
    #[serde(default, rename = "type")]
    pub kind: AppKind,

    /// Arguments passed to the application
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_args"
    )]
    pub args: Vec<String>,

    /// Seconds to hold after this launch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
}

/// Kind of application package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    #[default]
    Binary,
    Flatpak,
    Snap,
}

impl std::fmt::Display for AppKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppKind::Binary => write!(f, "binary"),
            AppKind::Flatpak => write!(f, "flatpak"),
            AppKind::Snap => write!(f, "snap"),
        }
    }
}

/// Scalar argument as it may appear in a workflow file
#[derive(Deserialize)]
#[serde(untagged)]
enum RawArg {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<RawArg> for String {
    fn from(arg: RawArg) -> Self {
        match arg {
            RawArg::Text(s) => s,
            RawArg::Integer(i) => i.to_string(),
            RawArg::Float(f) => f.to_string(),
            RawArg::Bool(b) => b.to_string(),
        }
    }
}

fn deserialize_args<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<RawArg> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(String::from).collect())
}

impl Workflow {
    /// Check runtime invariants that the type system does not enforce.
    ///
    /// Structural problems (missing keys, wrong types, negative targets) are
    /// rejected earlier, during deserialization.
    pub fn validate(&self, name: &str) -> Result<()> {
        for (i, step) in self.steps.iter().enumerate() {
            for (j, app) in step.apps.iter().enumerate() {
                let app_id = format!(
                    "app '{}' (app index {} in workspace target '{}', index {})",
                    app.name, j, step.target, i
                );

                if app.name.trim().is_empty() {
                    return Err(Error::WorkflowSchema(format!(
                        "{}: app index {} in workspace index {} has an empty 'name'",
                        name, j, i
                    )));
                }

                if app.exec.trim().is_empty() {
                    return Err(Error::WorkflowSchema(format!(
                        "{}: the 'exec' key for {} must be a non-empty string",
                        name, app_id
                    )));
                }

                if let Some(wait) = app.wait {
                    if !wait.is_finite() || wait < 0.0 {
                        return Err(Error::WorkflowSchema(format!(
                            "{}: the 'wait' key for {} must be a number >= 0, got {}",
                            name, app_id, wait
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Total number of app launches across all steps
    pub fn app_count(&self) -> usize {
        self.steps.iter().map(|s| s.apps.len()).sum()
    }

    /// The example workflow written by `floww init --example`
    pub fn example() -> Self {
        Self {
            description: Some("An example workflow.".to_string()),
            final_workspace: None,
            steps: vec![
                WorkspaceStep {
                    target: 1,
                    apps: vec![AppLaunch::new("Terminal", "gnome-terminal")],
                },
                WorkspaceStep {
                    target: 2,
                    apps: vec![AppLaunch::new("Browser", "firefox")
                        .with_args(["https://github.com/dagimg-dot/floww"])],
                },
            ],
        }
    }
}

impl AppLaunch {
    /// Create a binary app with no arguments
    pub fn new(name: &str, exec: &str) -> Self {
        Self {
            name: name.to_string(),
            exec: exec.to_string(),
            kind: AppKind::Binary,
            args: Vec::new(),
            wait: None,
        }
    }

    /// Set the app kind
    pub fn with_kind(mut self, kind: AppKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the post-launch wait in seconds
    pub fn with_wait(mut self, seconds: f64) -> Self {
        self.wait = Some(seconds);
        self
    }
}
