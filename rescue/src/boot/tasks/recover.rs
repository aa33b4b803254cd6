//! Task: Recovery launch.

use super::{BootCtx, log_task_error, task_start};
use crate::pipeline::PipelineTask;
use crate::recovery::{RecoveryLauncher, RecoveryOutcome};
use async_trait::async_trait;
use rescue_shared::errors::RescueResult;

pub struct RecoverTask;

#[async_trait]
impl PipelineTask<BootCtx> for RecoverTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> RescueResult<()> {
        let task_name = self.name();
        let mode = task_start(&ctx, task_name).await;

        let (tool, console, env) = {
            let ctx = ctx.lock().await;
            (
                ctx.services.recovery_tool.clone(),
                ctx.services.console.clone(),
                ctx.env.clone(),
            )
        };

        console.write_line(&format!("Launching '{}' {} recovery", tool.name(), mode.boot_mode()))?;

        let outcome = RecoveryLauncher::new(tool.as_ref())
            .launch(&mode, &env)
            .await
            .inspect_err(|e| log_task_error(task_name, e))?;

        match outcome {
            RecoveryOutcome::Success => console.write_line("Recovery finished successfully")?,
            RecoveryOutcome::Failure => {
                console.write_line("Recovery failed, check the log files for details")?
            }
        }

        ctx.lock().await.outcome = Some(outcome);
        Ok(())
    }

    fn name(&self) -> &str {
        "recover"
    }
}
