//! Configuration loading and management
//!
//! The config directory holds a main config file and a `workflows/`
//! subdirectory. The main file is read into a generic tree and resolved
//! field by field: an invalid value only resets that one field to its
//! default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::format::{FileFormat, EXTENSIONS};
use crate::{Error, Result};

/// Name of the application directory under the user config dir
pub const APP_DIR: &str = "floww";

const DEFAULT_WORKSPACE_SWITCH_WAIT: f64 = 3.0;
const DEFAULT_APP_LAUNCH_WAIT: f64 = 1.0;

/// Timing configuration applied while running a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Seconds to hold after the last app of an intermediate step
    pub workspace_switch_wait: f64,
    /// Seconds to hold after any other app
    pub app_launch_wait: f64,
    /// Whether per-app `wait` values override the defaults
    pub respect_app_wait: bool,
    /// Whether a desktop notification is sent when a run finishes
    pub show_notifications: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            workspace_switch_wait: DEFAULT_WORKSPACE_SWITCH_WAIT,
            app_launch_wait: DEFAULT_APP_LAUNCH_WAIT,
            respect_app_wait: true,
            show_notifications: true,
        }
    }
}

/// Resolved contents of the main config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub general: GeneralSettings,
    pub timing: TimingSettings,
}

/// `general` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub show_notifications: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            show_notifications: true,
        }
    }
}

/// `timing` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSettings {
    pub workspace_switch_wait: f64,
    pub app_launch_wait: f64,
    pub respect_app_wait: bool,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            workspace_switch_wait: DEFAULT_WORKSPACE_SWITCH_WAIT,
            app_launch_wait: DEFAULT_APP_LAUNCH_WAIT,
            respect_app_wait: true,
        }
    }
}

impl Settings {
    /// Resolve settings from a parsed config tree.
    ///
    /// Never fails: every missing or invalid field falls back to its own
    /// default.
    pub fn from_tree(tree: &Value) -> Self {
        let mut settings = Settings::default();

        let Some(root) = tree.as_object() else {
            if !tree.is_null() {
                warn!("Config root is not a mapping, using defaults");
            }
            return settings;
        };

        if let Some(general) = root.get("general").and_then(Value::as_object) {
            if let Some(value) = general.get("show_notifications") {
                resolve_bool(
                    "show_notifications",
                    value,
                    &mut settings.general.show_notifications,
                );
            }
        }

        if let Some(timing) = root.get("timing").and_then(Value::as_object) {
            if let Some(value) = timing.get("workspace_switch_wait") {
                resolve_seconds(
                    "workspace_switch_wait",
                    value,
                    &mut settings.timing.workspace_switch_wait,
                );
            }
            if let Some(value) = timing.get("app_launch_wait") {
                resolve_seconds(
                    "app_launch_wait",
                    value,
                    &mut settings.timing.app_launch_wait,
                );
            }
            if let Some(value) = timing.get("respect_app_wait") {
                resolve_bool(
                    "respect_app_wait",
                    value,
                    &mut settings.timing.respect_app_wait,
                );
            }
        }

        settings
    }

    /// Flatten into the timing view consumed by the runner
    pub fn timing_config(&self) -> TimingConfig {
        TimingConfig {
            workspace_switch_wait: self.timing.workspace_switch_wait,
            app_launch_wait: self.timing.app_launch_wait,
            respect_app_wait: self.timing.respect_app_wait,
            show_notifications: self.general.show_notifications,
        }
    }
}

fn resolve_seconds(key: &str, value: &Value, slot: &mut f64) {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(secs) if secs.is_finite() && secs >= 0.0 => *slot = secs,
        Some(secs) => warn!(
            "Invalid timing value for '{}' ({}), expected >= 0. Using default ({}).",
            key, secs, slot
        ),
        None => warn!(
            "Invalid non-numeric timing value for '{}' ('{}'). Using default ({}).",
            key, value, slot
        ),
    }
}

fn resolve_bool(key: &str, value: &Value, slot: &mut bool) {
    match value.as_bool() {
        Some(b) => *slot = b,
        None => warn!(
            "Invalid non-boolean value for '{}' ('{}'). Using default ({}).",
            key, value, slot
        ),
    }
}

/// Location of the floww config directory
#[derive(Debug, Clone)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    /// Use an explicit directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the directory: explicit path, then `$XDG_CONFIG_HOME/floww`,
    /// then the platform config dir, then `~/.config/floww`
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or_else(|| Error::Config("Cannot determine the config directory".to_string()))?;

        let dir = Self::new(base.join(APP_DIR));
        debug!("Using config directory: {}", dir.root.display());
        Ok(dir)
    }

    /// Root of the config directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding workflow files
    pub fn workflows_dir(&self) -> PathBuf {
        self.root.join("workflows")
    }

    /// Default main config file
    pub fn default_config_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    /// First existing main config file, `config.yaml` first
    pub fn config_file(&self) -> Option<PathBuf> {
        let preferred = self.default_config_file();
        if preferred.is_file() {
            return Some(preferred);
        }

        EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("config.{}", ext)))
            .find(|p| p.is_file())
    }

    /// True when both the directory and its workflows dir exist
    pub fn is_initialized(&self) -> bool {
        self.root.is_dir() && self.workflows_dir().is_dir()
    }

    /// Fail with a fatal config error when not initialized
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "floww is not initialized ({} missing). Run 'floww init' first.",
                self.root.display()
            )))
        }
    }

    /// Load settings from the main config file.
    ///
    /// A missing or unreadable file is not fatal: defaults are used.
    pub fn load_settings(&self) -> Settings {
        let Some(path) = self.config_file() else {
            debug!("No config file found in {}", self.root.display());
            return Settings::default();
        };

        match FileFormat::load::<Value>(&path) {
            Ok(tree) => {
                debug!("Loaded config from {}", path.display());
                Settings::from_tree(&tree)
            }
            Err(e) => {
                warn!("Error loading config file {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    /// Create the directory layout. Existing files are left untouched.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            Error::Config(format!(
                "Failed to initialize config directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        if self.config_file().is_none() {
            std::fs::write(self.default_config_file(), "{}\n")?;
        }

        let workflows = self.workflows_dir();
        if !workflows.exists() {
            std::fs::create_dir_all(&workflows)?;
        }

        Ok(())
    }
}
