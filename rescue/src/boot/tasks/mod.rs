//! Boot pipeline tasks.

mod debug_shell;
mod integrity;
mod outcome;
mod recover;
mod ready;
mod setup;

pub use debug_shell::DebugShellTask;
pub use integrity::IntegrityTask;
pub use outcome::{OutcomeMenuTask, UnattendedExitTask};
pub use recover::RecoverTask;
pub use ready::ReadyTask;
pub use setup::SetupTask;

use super::types::BootContext;
use crate::params::ModeDecision;
use rescue_shared::errors::RescueError;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type BootCtx = Arc<Mutex<BootContext>>;

async fn task_start(ctx: &BootCtx, task_name: &str) -> ModeDecision {
    let mode = ctx.lock().await.mode;
    tracing::debug!(task = task_name, mode = %mode.boot_mode(), "Starting task");
    mode
}

fn log_task_error(task_name: &str, err: &RescueError) {
    tracing::error!(task = task_name, error = %err, "Task failed");
}
