//! Run-completion notifications
//!
//! Supports:
//! - Desktop notifications (`notify-send`)
//! - Log output (for testing/headless use)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::workflow::RunReport;
use crate::{Error, Result};

/// Application name shown by the notification daemon
pub const APP_NAME: &str = "Floww";

/// Maximum number of failures listed in a notification body
const MAX_LISTED_ERRORS: usize = 3;

/// A notification to show the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification title
    pub title: String,
    /// Body text
    pub body: Option<String>,
    /// Whether this reports a failure
    pub is_error: bool,
}

impl Notification {
    /// Create a new notification
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: None,
            is_error: false,
        }
    }

    /// Set the body
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Build the completion notification for a finished run
    pub fn from_report(report: &RunReport) -> Self {
        let errors = report.errors();

        if errors.is_empty() && !report.interrupted {
            return Self::new("Workflow applied successfully");
        }

        let title = if errors.is_empty() {
            "Workflow interrupted".to_string()
        } else {
            let plural = if errors.len() == 1 { "" } else { "s" };
            format!("Workflow completed with {} error{}", errors.len(), plural)
        };

        let mut lines: Vec<String> = errors.iter().take(MAX_LISTED_ERRORS).cloned().collect();
        if errors.len() > MAX_LISTED_ERRORS {
            lines.push(format!("… and {} more", errors.len() - MAX_LISTED_ERRORS));
        }
        if report.interrupted && !errors.is_empty() {
            lines.push("Run was interrupted".to_string());
        }

        let mut notification = Self::new(&title);
        if !lines.is_empty() {
            notification = notification.with_body(&lines.join("\n"));
        }
        notification.is_error = true;
        notification
    }
}

/// Trait for notification channels
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name
    fn name(&self) -> &str;

    /// Send a notification
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Desktop notification channel
pub struct DesktopNotifier {
    program: String,
}

impl DesktopNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(&self, notification: &Notification) -> Vec<String> {
        let mut args = vec!["--app-name".to_string(), APP_NAME.to_string()];
        if notification.is_error {
            args.push("--urgency".to_string());
            args.push("critical".to_string());
        }
        args.push(notification.title.clone());
        if let Some(body) = &notification.body {
            args.push(body.clone());
        }
        args
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("notify-send")
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let status = Command::new(&self.program)
            .args(self.args(notification))
            .status()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::Notification(format!(
                    "{} not found, cannot notify user",
                    self.program
                )),
                _ => Error::Notification(format!("{} failed: {}", self.program, e)),
            })?;

        if !status.success() {
            return Err(Error::Notification(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        debug!("Desktop notification sent");
        Ok(())
    }
}

/// Log notification channel (for testing/debugging)
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        if notification.is_error {
            warn!("📬 {}", notification.title);
        } else {
            info!("📬 {}", notification.title);
        }
        if let Some(body) = &notification.body {
            debug!("{}", body);
        }
        Ok(())
    }
}
