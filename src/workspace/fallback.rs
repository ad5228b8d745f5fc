//! Primary-then-fallback composition

use async_trait::async_trait;
use tracing::{debug, warn};

use super::WorkspaceBackend;
use crate::{Error, Result};

/// Tries `primary`, then `fallback` with the same index when it fails
pub struct FallbackBackend {
    primary: Box<dyn WorkspaceBackend>,
    fallback: Box<dyn WorkspaceBackend>,
    name: String,
}

impl FallbackBackend {
    pub fn new(primary: Box<dyn WorkspaceBackend>, fallback: Box<dyn WorkspaceBackend>) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            name,
        }
    }
}

#[async_trait]
impl WorkspaceBackend for FallbackBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn switch_to(&self, index: u32) -> Result<()> {
        let primary_err = match self.primary.switch_to(index).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!(
            "{} failed to switch to workspace {} ({}), trying {}",
            self.primary.name(),
            index,
            primary_err,
            self.fallback.name()
        );

        match self.fallback.switch_to(index).await {
            Ok(()) => {
                debug!("{} switched to workspace {}", self.fallback.name(), index);
                Ok(())
            }
            Err(fallback_err) => Err(Error::Workspace(format!(
                "{}: {}; {}: {}",
                self.primary.name(),
                primary_err,
                self.fallback.name(),
                fallback_err
            ))),
        }
    }
}
