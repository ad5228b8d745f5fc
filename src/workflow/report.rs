//! Per-run outcome tracking
//!
//! A [`RunReport`] is owned by one `apply` call. Workspace switches and app
//! launches append tagged outcomes; failures never abort the run, they are
//! only counted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Result of one switch or launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Failed { reason } => Some(reason),
        }
    }
}

impl<E: std::fmt::Display> From<Result<(), E>> for Outcome {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// A workspace switch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchRecord {
    /// Requested workspace index
    pub target: u32,
    /// Whether this was the trailing `final_workspace` switch
    pub is_final: bool,
    pub outcome: Outcome,
}

/// An application launch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRecord {
    /// Index of the step within the workflow
    pub step: usize,
    /// App display name
    pub app: String,
    /// Rendered command line
    pub command: String,
    /// Seconds held after the launch
    pub wait_secs: f64,
    pub outcome: Outcome,
}

/// Outcome of one workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub id: String,
    /// Workflow description, if any
    pub description: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Switches in the order they were attempted
    pub switches: Vec<SwitchRecord>,
    /// Launches in the order they were attempted
    pub launches: Vec<LaunchRecord>,
    /// Whether the run was cut short by an interrupt
    pub interrupted: bool,
}

impl RunReport {
    /// Start a new report
    pub fn new(description: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.map(str::to_string),
            started_at: Utc::now(),
            finished_at: None,
            switches: Vec::new(),
            launches: Vec::new(),
            interrupted: false,
        }
    }

    pub fn record_switch(&mut self, target: u32, is_final: bool, outcome: Outcome) {
        self.switches.push(SwitchRecord {
            target,
            is_final,
            outcome,
        });
    }

    pub fn record_launch(
        &mut self,
        step: usize,
        app: &str,
        command: &str,
        wait: Duration,
        outcome: Outcome,
    ) {
        self.launches.push(LaunchRecord {
            step,
            app: app.to_string(),
            command: command.to_string(),
            wait_secs: wait.as_secs_f64(),
            outcome,
        });
    }

    /// Mark the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of failed switches and launches
    pub fn error_count(&self) -> usize {
        let switch_errors = self.switches.iter().filter(|s| !s.outcome.is_success());
        let launch_errors = self.launches.iter().filter(|l| !l.outcome.is_success());
        switch_errors.count() + launch_errors.count()
    }

    /// Human-readable description of every failure, in run order
    pub fn errors(&self) -> Vec<String> {
        let switches = self.switches.iter().filter_map(|s| {
            s.outcome.reason().map(|reason| {
                let label = if s.is_final { "final workspace" } else { "workspace" };
                format!("switch to {} {}: {}", label, s.target, reason)
            })
        });
        let launches = self.launches.iter().filter_map(|l| {
            l.outcome
                .reason()
                .map(|reason| format!("launch {}: {}", l.app, reason))
        });
        switches.chain(launches).collect()
    }

    /// True when nothing failed and the run was not interrupted
    pub fn is_success(&self) -> bool {
        self.error_count() == 0 && !self.interrupted
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Wall-clock duration of the run, if finished
    pub fn elapsed(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|end| (end - self.started_at).to_std().ok())
    }

    /// Get a summary of the run
    pub fn summary(&self) -> String {
        let launched = self
            .launches
            .iter()
            .filter(|l| l.outcome.is_success())
            .count();

        let mut out = format!("Run {}\n", self.id);
        if let Some(desc) = &self.description {
            out.push_str(&format!("Workflow: {}\n", desc));
        }
        out.push_str(&format!(
            "Switches: {}  Launched: {}/{}  Errors: {}\n",
            self.switches.len(),
            launched,
            self.launches.len(),
            self.error_count()
        ));
        if let Some(elapsed) = self.elapsed() {
            let rounded = Duration::from_secs(elapsed.as_secs());
            out.push_str(&format!(
                "Elapsed: {}\n",
                humantime::format_duration(rounded)
            ));
        }
        if self.interrupted {
            out.push_str("Interrupted before completion\n");
        }
        for error in self.errors() {
            out.push_str(&format!("  ✗ {}\n", error));
        }
        out
    }
}
