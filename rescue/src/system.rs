//! Privileged system actions.

use crate::util::spawn_detached_shell;
use async_trait::async_trait;
use rescue_shared::errors::{RescueError, RescueResult};
use std::path::Path;

/// Reboot command, run without arguments.
const REBOOT_COMMAND: &str = "reboot";

/// Actions that leave the orchestrator's own process.
#[async_trait]
pub trait SystemControl: Send + Sync {
    /// Reboot the machine.
    async fn reboot(&self) -> RescueResult<()>;

    /// Start an unsupervised shell on `tty`; nothing waits for it.
    fn spawn_debug_shell(&self, shell: &Path, tty: &Path) -> RescueResult<()>;
}

/// The machine the orchestrator runs on.
#[derive(Debug, Default)]
pub struct HostSystem;

impl HostSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SystemControl for HostSystem {
    async fn reboot(&self) -> RescueResult<()> {
        tracing::info!("Rebooting");

        let status = tokio::process::Command::new(REBOOT_COMMAND)
            .status()
            .await
            .map_err(|e| RescueError::Engine(format!("Failed to run {}: {}", REBOOT_COMMAND, e)))?;

        if !status.success() {
            return Err(RescueError::Engine(format!(
                "{} exited with {}",
                REBOOT_COMMAND, status
            )));
        }
        Ok(())
    }

    fn spawn_debug_shell(&self, shell: &Path, tty: &Path) -> RescueResult<()> {
        let pid = spawn_detached_shell(shell, tty)?;
        tracing::info!(pid, shell = %shell.display(), tty = %tty.display(), "Debug shell started");
        Ok(())
    }
}
