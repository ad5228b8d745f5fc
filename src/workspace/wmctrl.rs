//! wmctrl backend

use async_trait::async_trait;
use tracing::info;

use super::{run_command, WorkspaceBackend};
use crate::Result;

/// Workspace switching through `wmctrl -s`
pub struct WmctrlBackend {
    program: String,
}

impl WmctrlBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for WmctrlBackend {
    fn default() -> Self {
        Self::new("wmctrl")
    }
}

#[async_trait]
impl WorkspaceBackend for WmctrlBackend {
    fn name(&self) -> &str {
        "wmctrl"
    }

    async fn switch_to(&self, index: u32) -> Result<()> {
        run_command(&self.program, &["-s".to_string(), index.to_string()]).await?;
        info!("Switched to desktop {} via wmctrl", index);
        Ok(())
    }
}
