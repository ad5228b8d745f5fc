//! Post-launch wait resolution
//!
//! Exactly one wait is applied after every launch. Precedence:
//!
//! 1. an explicit per-app `wait`, when `respect_app_wait` is on
//! 2. nothing after the last app of the last step
//! 3. `workspace_switch_wait` after the last app of any other step
//! 4. `app_launch_wait` otherwise

use std::time::Duration;

use super::model::AppLaunch;
use crate::config::TimingConfig;

/// Where an app sits within the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppPosition {
    pub is_last_app_in_step: bool,
    pub is_last_step: bool,
}

impl AppPosition {
    /// Position of app `app_idx` of `app_count` in step `step_idx` of `step_count`
    pub fn new(app_idx: usize, app_count: usize, step_idx: usize, step_count: usize) -> Self {
        Self {
            is_last_app_in_step: app_idx + 1 == app_count,
            is_last_step: step_idx + 1 == step_count,
        }
    }
}

/// Resolve the wait to hold after launching `app`
pub fn resolve_app_wait(app: &AppLaunch, position: AppPosition, timing: &TimingConfig) -> Duration {
    if timing.respect_app_wait {
        if let Some(wait) = app.wait {
            return seconds(wait);
        }
    }

    match (position.is_last_app_in_step, position.is_last_step) {
        (true, true) => Duration::ZERO,
        (true, false) => seconds(timing.workspace_switch_wait),
        (false, _) => seconds(timing.app_launch_wait),
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
