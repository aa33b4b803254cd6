//! Task: System setup.
//!
//! Best effort throughout: an unreadable setup directory is reported to the
//! operator and the boot carries on with no units run.

use super::{BootCtx, log_task_error, task_start};
use crate::pipeline::PipelineTask;
use crate::setup::{SetupReport, SetupSequencer, discover_units};
use async_trait::async_trait;
use rescue_shared::errors::RescueResult;

pub struct SetupTask;

#[async_trait]
impl PipelineTask<BootCtx> for SetupTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> RescueResult<()> {
        let task_name = self.name();
        let mode = task_start(&ctx, task_name).await;

        let (setup_dir, runner, console, trace, mut env) = {
            let mut ctx = ctx.lock().await;
            (
                ctx.layout.setup_dir(),
                ctx.services.unit_runner.clone(),
                ctx.services.console.clone(),
                ctx.trace.clone(),
                std::mem::take(&mut ctx.env),
            )
        };

        let result = match discover_units(&setup_dir) {
            Ok(units) => {
                tracing::info!(dir = %setup_dir.display(), count = units.len(), "Running setup units");
                SetupSequencer::new(runner.as_ref(), console.as_ref(), trace)
                    .run(&units, mode.debug, &mut env)
                    .await
                    .inspect_err(|e| log_task_error(task_name, e))
            }
            Err(e) => {
                tracing::warn!(dir = %setup_dir.display(), error = %e, "Setup units not run");
                console
                    .write_line(&format!(
                        "Cannot read {}, no setup units were run",
                        setup_dir.display()
                    ))
                    .map(|_| SetupReport::default())
            }
        };

        let mut ctx = ctx.lock().await;
        ctx.env = env;
        ctx.setup_report = Some(result?);

        Ok(())
    }

    fn name(&self) -> &str {
        "system_setup"
    }
}
