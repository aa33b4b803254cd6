//! Task: Debug shell.
//!
//! Starts a shell on a spare terminal and forgets about it.

use super::{BootCtx, task_start};
use crate::pipeline::PipelineTask;
use async_trait::async_trait;
use rescue_shared::errors::RescueResult;

pub struct DebugShellTask;

#[async_trait]
impl PipelineTask<BootCtx> for DebugShellTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> RescueResult<()> {
        task_start(&ctx, self.name()).await;

        let (config, system, console) = {
            let ctx = ctx.lock().await;
            (
                ctx.config.clone(),
                ctx.services.system.clone(),
                ctx.services.console.clone(),
            )
        };

        // Not having the shell is no reason to stop booting
        if let Err(e) = system.spawn_debug_shell(&config.debug_shell, &config.debug_shell_tty) {
            tracing::warn!(tty = %config.debug_shell_tty.display(), error = %e, "Debug shell not started");
            console.write_line(&format!(
                "Could not start debug shell on {}",
                config.debug_shell_tty.display()
            ))?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "debug_shell"
    }
}
