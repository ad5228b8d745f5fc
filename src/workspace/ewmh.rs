//! EWMH backend
//!
//! Sets `_NET_CURRENT_DESKTOP` through `xdotool`, after checking the index
//! against `_NET_NUMBER_OF_DESKTOPS`.

use async_trait::async_trait;
use tracing::info;

use super::{run_command, WorkspaceBackend};
use crate::{Error, Result};

/// EWMH workspace switching through xdotool
pub struct EwmhBackend {
    /// Path to xdotool binary
    program: String,
}

impl EwmhBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Number of desktops reported by the window manager
    pub async fn desktop_count(&self) -> Result<u32> {
        let out = run_command(&self.program, &["get_num_desktops".to_string()]).await?;
        parse_desktop_count(&out)
    }
}

impl Default for EwmhBackend {
    fn default() -> Self {
        Self::new("xdotool")
    }
}

fn parse_desktop_count(out: &str) -> Result<u32> {
    out.trim().parse::<u32>().map_err(|_| {
        Error::Workspace(format!("unexpected desktop count from xdotool: '{}'", out))
    })
}

fn check_range(index: u32, count: u32) -> Result<()> {
    if index < count {
        Ok(())
    } else if count == 0 {
        Err(Error::Workspace(format!(
            "invalid desktop number {}: window manager reports no desktops",
            index
        )))
    } else {
        Err(Error::Workspace(format!(
            "invalid desktop number {}. Available desktops: 0-{}",
            index,
            count - 1
        )))
    }
}

#[async_trait]
impl WorkspaceBackend for EwmhBackend {
    fn name(&self) -> &str {
        "ewmh"
    }

    async fn switch_to(&self, index: u32) -> Result<()> {
        let count = self.desktop_count().await?;
        check_range(index, count)?;

        run_command(&self.program, &["set_desktop".to_string(), index.to_string()]).await?;
        info!("Switched to desktop {} via EWMH", index);
        Ok(())
    }
}
