//! Signal handling for workflow runs
//!
//! The first Ctrl+C cancels the run's token: the current wait is cut short
//! and remaining steps are skipped. A second Ctrl+C exits immediately.
//! Applications that were already launched keep running.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Exit code used when a second interrupt forces an exit
pub const FORCED_EXIT_CODE: i32 = 130;

/// Routes interrupts to a cancellation token
pub struct SignalHandler {
    token: CancellationToken,
    interrupt_count: Arc<AtomicUsize>,
}

impl SignalHandler {
    /// Create a new signal handler
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            interrupt_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle one interrupt; returns true when the caller should force exit
    pub fn interrupt(&self) -> bool {
        let count = self.interrupt_count.fetch_add(1, Ordering::SeqCst);

        if count == 0 {
            warn!("Interrupt received, stopping after the current action (Ctrl+C again to force)");
            self.token.cancel();
            false
        } else {
            debug!("Second interrupt received");
            true
        }
    }

    /// Install the process-wide Ctrl+C handler
    pub fn install(self) -> Result<()> {
        ctrlc::set_handler(move || {
            if self.interrupt() {
                std::process::exit(FORCED_EXIT_CODE);
            }
        })
        .map_err(|e| Error::Config(format!("Failed to set signal handler: {}", e)))
    }
}

/// Install a Ctrl+C handler that cancels `token`
pub fn install_interrupt_handler(token: CancellationToken) -> Result<()> {
    SignalHandler::new(token).install()
}
